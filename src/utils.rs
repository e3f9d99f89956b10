//! File system helpers used by target actions

use crate::error::{ExecutionError, ExecutionResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Paths under `base` matching `pattern`, sorted
pub fn glob_paths(base: &Path, pattern: &str) -> ExecutionResult<Vec<PathBuf>> {
    // The base may contain glob metacharacters of its own
    let base = glob::Pattern::escape(&base.to_string_lossy());
    let full = format!("{}/{}", base.trim_end_matches('/'), pattern);

    let entries = glob::glob(&full).map_err(|e| ExecutionError::Pattern {
        pattern: full.clone(),
        error: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
    paths.sort();
    Ok(paths)
}

/// Files under `base` matching `pattern`
pub fn glob_files(base: &Path, pattern: &str) -> ExecutionResult<Vec<PathBuf>> {
    Ok(glob_paths(base, pattern)?
        .into_iter()
        .filter(|p| p.is_file())
        .collect())
}

/// Directories under `base` matching any of `patterns`.
///
/// Directories nested inside another match are dropped, since deleting the
/// outer one removes them too.
pub fn glob_directories(base: &Path, patterns: &[&str]) -> ExecutionResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for pattern in patterns {
        dirs.extend(glob_paths(base, pattern)?.into_iter().filter(|p| p.is_dir()));
    }
    dirs.sort();
    dirs.dedup();

    let mut outermost: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        if !outermost.iter().any(|outer| dir.starts_with(outer)) {
            outermost.push(dir);
        }
    }
    Ok(outermost)
}

/// Delete a directory tree; a missing directory is not an error
pub fn delete_directory(path: &Path) -> ExecutionResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExecutionError::file_system(path, e)),
    }
}

/// Make `path` an existing, empty directory
pub fn ensure_clean_directory(path: &Path) -> ExecutionResult<()> {
    if path.is_dir() {
        for entry in fs::read_dir(path).map_err(|e| ExecutionError::file_system(path, e))? {
            let entry = entry.map_err(|e| ExecutionError::file_system(path, e))?;
            let entry_path = entry.path();
            let result = if entry_path.is_dir() {
                fs::remove_dir_all(&entry_path)
            } else {
                fs::remove_file(&entry_path)
            };
            result.map_err(|e| ExecutionError::file_system(&entry_path, e))?;
        }
        Ok(())
    } else {
        fs::create_dir_all(path).map_err(|e| ExecutionError::file_system(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_glob_directories_outermost_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("App/bin/Debug/App.dll"));
        touch(&root.join("App/obj/project.assets.json"));
        touch(&root.join("App/bin/Debug/obj/stray.txt"));
        touch(&root.join("App/Program.cs"));

        let dirs = glob_directories(root, &["**/bin", "**/obj"]).unwrap();
        assert_eq!(dirs, vec![root.join("App/bin"), root.join("App/obj")]);
    }

    #[test]
    fn test_glob_files_ignores_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("App.1.0.0.nupkg"));
        fs::create_dir(root.join("odd.nupkg")).unwrap();

        let files = glob_files(root, "*.nupkg").unwrap();
        assert_eq!(files, vec![root.join("App.1.0.0.nupkg")]);
    }

    #[test]
    fn test_glob_base_with_metacharacters() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("[weird]");
        touch(&base.join("a.sln"));

        let files = glob_files(&base, "*.sln").unwrap();
        assert_eq!(files, vec![base.join("a.sln")]);
    }

    #[test]
    fn test_delete_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(delete_directory(&temp_dir.path().join("missing")).is_ok());
    }

    #[test]
    fn test_ensure_clean_directory() {
        let temp_dir = TempDir::new().unwrap();
        let artifacts = temp_dir.path().join("artifacts");

        ensure_clean_directory(&artifacts).unwrap();
        assert!(artifacts.is_dir());

        touch(&artifacts.join("old.nupkg"));
        touch(&artifacts.join("nested/coverage.xml"));
        ensure_clean_directory(&artifacts).unwrap();

        assert!(artifacts.is_dir());
        assert_eq!(fs::read_dir(&artifacts).unwrap().count(), 0);
    }
}
