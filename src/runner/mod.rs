//! Target graph execution
//!
//! This module holds the run context, target definitions, planning,
//! guard evaluation and the external command layer.

pub mod command;
pub mod context;
pub mod dotnet;
pub mod executor;
pub mod guard;
pub mod interpolate;
pub mod parameters;
pub mod plan;
pub mod repository;
pub mod target;

// Re-export main types
pub use command::*;
pub use context::*;
pub use executor::*;
pub use guard::*;
pub use parameters::{BuildHost, Configuration, ParameterInputs, Parameters};
pub use plan::*;
pub use repository::*;
pub use target::*;
