//! Error types for ubuild

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ubuild operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Main error type for ubuild
#[derive(Error, Debug)]
pub enum BuildError {
    /// Configuration, parameter and target graph errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A target's action failed; the rest of the plan was aborted
    #[error("Target '{target}' failed: {source}")]
    TargetFailed {
        target: String,
        #[source]
        source: ExecutionError,
    },

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings, parameter and target graph errors.
///
/// All of these are detected before any target action runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find settings file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No such target '{0}'")]
    TargetNotFound(String),

    #[error("Target '{target}' references unknown target '{reference}'")]
    UnknownReference { target: String, reference: String },

    #[error("Target '{0}' is defined more than once")]
    DuplicateTarget(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Parameter '{parameter}' is required by target '{target}' but was not provided")]
    MissingParameter { target: String, parameter: String },

    #[error("Target '{target}' requires {requirement}")]
    RequirementNotMet { target: String, requirement: String },

    #[error("Invalid value for parameter '{name}': {error}")]
    InvalidParameter { name: String, error: String },
}

/// Errors raised by target actions
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command `{command}` {}", exit_status(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to start `{program}`: {error}")]
    Spawn { program: String, error: String },

    #[error("No files matched '{0}'")]
    NoMatch(String),

    #[error("Failed to push {failed} of {total} package(s): {packages}")]
    PushFailed {
        failed: usize,
        total: usize,
        packages: String,
    },

    #[error("File system error on '{}': {error}", .path.display())]
    FileSystem { path: PathBuf, error: String },

    #[error("Invalid pattern '{pattern}': {error}")]
    Pattern { pattern: String, error: String },
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("failed with exit code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl ExecutionError {
    /// Wrap an I/O error with the path it happened on
    pub fn file_system(path: impl Into<PathBuf>, error: io::Error) -> Self {
        ExecutionError::FileSystem {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_names_target_and_parameter() {
        let err = ConfigError::MissingParameter {
            target: "Publish".to_string(),
            parameter: "nuget-key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Publish"));
        assert!(msg.contains("nuget-key"));
    }

    #[test]
    fn test_target_failed_reports_command_and_status() {
        let err = BuildError::TargetFailed {
            target: "Compile".to_string(),
            source: ExecutionError::CommandFailed {
                command: "dotnet build".to_string(),
                code: Some(1),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("Compile"));
        assert!(msg.contains("dotnet build"));
        assert!(msg.ends_with("`dotnet build` failed with exit code 1"));
    }

    #[test]
    fn test_command_killed_by_signal() {
        let err = ExecutionError::CommandFailed {
            command: "dotnet test".to_string(),
            code: None,
        };
        assert_eq!(
            err.to_string(),
            "Command `dotnet test` was terminated by a signal"
        );
    }
}
