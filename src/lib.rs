//! ubuild - target-based build automation for .NET solutions
//!
//! A build is a registry of named targets with dependencies, ordering hints
//! and guards. ubuild resolves the requested target into an ordered plan and
//! runs each target's action once, stopping at the first failure.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod targets;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::{BuildError, Result};

/// Current version of ubuild
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
