//! Integration tests for settings discovery and parsing

mod common;

use common::{create_workspace_with_settings, write};
use std::fs;
use ubuild::config::{find_settings_file_from, parse_settings, parse_settings_file, validate_settings};
use ubuild::error::{BuildError, ConfigError};

#[test]
fn test_full_settings_file() {
    let yaml = r#"
default_target: CI
solution: build/Ubiety.Dns.sln
source_dir: lib
tests_dir: checks
artifacts_dir: out
test_project: "**/*.Tests.csproj"
main_branches: [master, release]

nuget:
  source: https://nuget.example.com/v3/index.json

sonar:
  organization: acme

publish:
  retries: 3
  skip_duplicate: false
  continue_on_failure: false

version:
  on_unix: true

tools:
  dotnet: /opt/dotnet/dotnet

coverage:
  exclude: "[xunit.*]*,[*.Fakes]*"
"#;
    let (_workspace, path) = create_workspace_with_settings(yaml);

    let settings = parse_settings_file(&path).unwrap();
    validate_settings(&settings).unwrap();

    assert_eq!(settings.default_target, "CI");
    assert_eq!(settings.solution.as_deref(), Some("build/Ubiety.Dns.sln"));
    assert_eq!(settings.main_branches, vec!["master", "release"]);
    assert_eq!(settings.nuget.source, "https://nuget.example.com/v3/index.json");
    assert_eq!(settings.sonar.organization, "acme");
    assert_eq!(settings.sonar.server, "https://sonarcloud.io");
    assert_eq!(settings.publish.retries, 3);
    assert!(!settings.publish.skip_duplicate);
    assert!(settings.version.on_unix);
    assert_eq!(settings.tools.dotnet, "/opt/dotnet/dotnet");
    assert_eq!(settings.tools.git, "git");
    assert_eq!(settings.coverage.format, "opencover");
}

#[test]
fn test_discovery_from_nested_directory() {
    let (workspace, path) = create_workspace_with_settings("default_target: Pack\n");
    let nested = workspace.path().join("src/App");

    let found = find_settings_file_from(nested).unwrap();
    assert_eq!(found, path);
}

#[test]
fn test_yaml_extension_is_found() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write(temp_dir.path(), "ubuild.yaml", "default_target: Compile\n");

    let found = find_settings_file_from(temp_dir.path().to_path_buf()).unwrap();
    assert_eq!(found, temp_dir.path().join("ubuild.yaml"));
}

#[test]
fn test_unknown_key_is_rejected() {
    let result = parse_settings("defualt_target: Test\n");
    assert!(matches!(result, Err(BuildError::Yaml(_))));
}

#[test]
fn test_invalid_test_project_pattern() {
    let settings = parse_settings("test_project: \"[unclosed\"\n").unwrap();
    assert!(matches!(
        validate_settings(&settings),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_undefined_variable_in_path() {
    let result = parse_settings("artifacts_dir: ${UBUILD_TEST_SURELY_UNDEFINED}/out\n");
    assert!(matches!(result, Err(BuildError::Interpolation(_))));
}

#[test]
fn test_unreadable_settings_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("ubuild.yml");
    fs::create_dir(&path).unwrap();

    assert!(matches!(
        parse_settings_file(&path),
        Err(BuildError::Config(ConfigError::Invalid(_)))
    ));
}
