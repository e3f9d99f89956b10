//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a minimal .NET repository layout: a solution, a library project
/// and a test project
pub fn create_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(root, "App.sln", "");
    write(root, "src/App/App.csproj", "<Project />");
    write(root, "tests/App.Test/App.Test.csproj", "<Project />");

    temp_dir
}

/// Create a workspace with a ubuild.yml settings file
pub fn create_workspace_with_settings(settings: &str) -> (TempDir, PathBuf) {
    let temp_dir = create_workspace();
    let settings_path = temp_dir.path().join("ubuild.yml");
    fs::write(&settings_path, settings).unwrap();
    (temp_dir, settings_path)
}

/// Write a file, creating parent directories
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// The ubuild binary, isolated from parameters set in the outer environment
pub fn ubuild(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("ubuild").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("NUGET_KEY")
        .env_remove("SONAR_KEY")
        .env_remove("SONAR_PROJECT_KEY")
        .env_remove("CONFIGURATION")
        .env_remove("COVER")
        .env_remove("UBUILD_BRANCH");
    cmd
}
