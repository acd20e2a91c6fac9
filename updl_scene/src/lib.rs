pub mod extract;
pub mod flow;
pub mod node;

pub use extract::*;
pub use flow::*;
pub use node::*;
