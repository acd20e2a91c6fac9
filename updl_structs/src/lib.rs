pub mod coerce;
pub mod color;
pub mod path;
pub mod transform;
pub mod vector3;

pub use coerce::*;
pub use color::*;
pub use path::*;
pub use transform::*;
pub use vector3::*;
