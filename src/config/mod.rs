//! Settings parsing and validation
//!
//! This module handles discovery and parsing of the optional ubuild.yml
//! settings file and validation of its values.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
