//! Compiles UPDL flows into runtime scripts.
//!
//! [`HandlerManager`] is the entry point: it extracts the flow's nodes, runs the category
//! compilers, and returns either [`ProcessedGameData`] or, for multiplayer builds,
//! [`MultiplayerGameData`] derived from the same single-player result.

/// Candidate paths for a component or entity parameter: the node data itself, then `inputs`,
/// `properties` and `inputs.properties`.
macro_rules! param_paths {
    ($name:literal) => {
        &[
            &[$name],
            &["inputs", $name],
            &["properties", $name],
            &["inputs", "properties", $name],
        ]
    };
}

pub mod actions;
pub mod components;
pub mod datas;
pub mod entities;
mod error;
pub mod events;
pub mod handler_manager;
mod kinds;
pub mod lights;
pub mod network;
pub mod output;
pub mod script;
pub mod spaces;

pub use components::ComponentCompiler;
pub use entities::EntityCompiler;
pub use error::CompileError;
pub use handler_manager::HandlerManager;
pub use kinds::*;
pub use output::*;
