//! Settings validation
//!
//! Checks the values serde cannot express as types.

use crate::config::types::Settings;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;

/// Upper bound on push retries
pub const MAX_PUSH_RETRIES: u32 = 20;

/// Validate complete settings
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    if settings.default_target.trim().is_empty() {
        return Err(invalid("default_target must not be empty"));
    }

    for (key, dir) in [
        ("source_dir", &settings.source_dir),
        ("tests_dir", &settings.tests_dir),
        ("artifacts_dir", &settings.artifacts_dir),
    ] {
        if dir.trim().is_empty() {
            return Err(invalid(&format!("{} must not be empty", key)));
        }
    }

    validate_test_project(&settings.test_project)?;

    if settings.main_branches.iter().all(|b| b.trim().is_empty()) {
        return Err(invalid("main_branches must name at least one branch"));
    }

    if settings.publish.retries > MAX_PUSH_RETRIES {
        return Err(invalid(&format!(
            "publish.retries must be at most {}, got {}",
            MAX_PUSH_RETRIES, settings.publish.retries
        )));
    }

    for (key, tool) in [
        ("tools.dotnet", &settings.tools.dotnet),
        ("tools.gitversion", &settings.tools.gitversion),
        ("tools.git", &settings.tools.git),
    ] {
        if tool.trim().is_empty() {
            return Err(invalid(&format!("{} must not be empty", key)));
        }
    }

    Ok(())
}

/// The test project glob is joined onto tests_dir, so it has to be relative
fn validate_test_project(pattern: &str) -> ConfigResult<()> {
    if pattern.trim().is_empty() {
        return Err(invalid("test_project must not be empty"));
    }
    if Path::new(pattern).is_absolute() {
        return Err(invalid(&format!(
            "test_project must be relative to tests_dir: {}",
            pattern
        )));
    }
    glob::Pattern::new(pattern)
        .map_err(|e| invalid(&format!("test_project is not a valid glob: {}", e)))?;
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
