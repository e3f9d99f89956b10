//! Settings file parsing and discovery

use crate::config::types::Settings;
use crate::error::{BuildError, ConfigError, ConfigResult};
use crate::runner::interpolate;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file names to search for
const SETTINGS_FILE_NAMES: &[&str] = &["ubuild.yml", "ubuild.yaml"];

/// Find the settings file by searching the current and parent directories
pub fn find_settings_file() -> ConfigResult<PathBuf> {
    find_settings_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the settings file starting from a specific directory
pub fn find_settings_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in SETTINGS_FILE_NAMES {
            let settings_path = current_dir.join(file_name);
            searched_paths.push(settings_path.display().to_string());

            if settings_path.is_file() {
                return Ok(settings_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a settings file from a path
pub fn parse_settings_file(path: &Path) -> Result<Settings, BuildError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    parse_settings(&contents)
}

/// Parse settings from a string.
///
/// Path-like values may reference environment variables as `${VAR}`.
pub fn parse_settings(yaml: &str) -> Result<Settings, BuildError> {
    // An empty document deserializes to unit, not to a map
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }

    let mut settings: Settings = serde_yaml::from_str(yaml)?;
    expand_variables(&mut settings)?;
    Ok(settings)
}

/// Expand `${VAR}` references in path and endpoint values
fn expand_variables(settings: &mut Settings) -> Result<(), BuildError> {
    for value in [
        &mut settings.source_dir,
        &mut settings.tests_dir,
        &mut settings.artifacts_dir,
        &mut settings.nuget.source,
        &mut settings.sonar.server,
    ] {
        *value = interpolate::interpolate_strict(value)?;
    }

    if let Some(solution) = settings.solution.as_mut() {
        *solution = interpolate::interpolate_strict(solution)?;
    }

    Ok(())
}

/// Load settings with automatic discovery.
///
/// Returns the defaults and no path when no settings file exists.
pub fn load_settings_auto() -> Result<(Settings, Option<PathBuf>), BuildError> {
    match find_settings_file() {
        Ok(path) => {
            let settings = parse_settings_file(&path)?;
            Ok((settings, Some(path)))
        }
        Err(ConfigError::NotFound(_)) => Ok((Settings::default(), None)),
        Err(e) => Err(e.into()),
    }
}
