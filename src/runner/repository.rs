//! Repository and version metadata
//!
//! Branch detection prefers an explicit override, then the branch variables
//! CI servers export (their checkouts are often detached), then git itself.
//! Version numbers come from the GitVersion tool's JSON output.

use crate::config::Settings;
use crate::runner::capture_stdout;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Branch variables exported by CI servers, checked in order
const BRANCH_VARIABLES: &[&str] = &[
    "GITHUB_REF_NAME",
    "BUILD_SOURCEBRANCHNAME",
    "APPVEYOR_REPO_BRANCH",
    "TRAVIS_BRANCH",
    "CI_COMMIT_BRANCH",
    "BRANCH_NAME",
];

/// Version control metadata of the checkout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    pub branch: Option<String>,
    pub commit: Option<String>,
}

impl Repository {
    /// Metadata for a known branch and unknown commit
    pub fn on_branch(branch: &str) -> Self {
        Repository {
            branch: Some(branch.to_string()),
            commit: None,
        }
    }

    /// Inspect the checkout at `root`
    pub fn detect(root: &Path, git: &str, branch_override: Option<String>) -> Self {
        let branch = branch_override
            .filter(|b| !b.trim().is_empty())
            .or_else(|| branch_from_environment(|name| env::var(name).ok()))
            .or_else(|| {
                capture_stdout(git, &["rev-parse", "--abbrev-ref", "HEAD"], root)
                    // Detached checkouts report the literal HEAD
                    .filter(|b| b != "HEAD")
            });

        let commit = capture_stdout(git, &["rev-parse", "HEAD"], root);

        Repository { branch, commit }
    }

    /// Whether the current branch is any of `branches`.
    ///
    /// `refs/heads/` and `origin/` prefixes are ignored.
    pub fn is_on_branch(&self, branches: &[String]) -> bool {
        let Some(current) = self.branch.as_deref() else {
            return false;
        };
        let current = normalize_branch(current);
        branches
            .iter()
            .any(|b| normalize_branch(b).eq_ignore_ascii_case(current))
    }
}

fn normalize_branch(branch: &str) -> &str {
    let branch = branch.trim();
    let branch = branch.strip_prefix("refs/heads/").unwrap_or(branch);
    branch.strip_prefix("origin/").unwrap_or(branch)
}

fn branch_from_environment<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    BRANCH_VARIABLES
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

/// Semantic version numbers computed by GitVersion
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub assembly_sem_ver: String,
    pub assembly_sem_file_ver: String,
    pub informational_version: String,
    #[serde(rename = "NuGetVersionV2")]
    pub nuget_version_v2: String,
}

impl VersionInfo {
    /// Run GitVersion at `root`.
    ///
    /// Returns `None` when detection is disabled for this platform, the tool
    /// is missing, or its output cannot be parsed.
    pub fn detect(root: &Path, settings: &Settings) -> Option<Self> {
        if cfg!(unix) && !settings.version.on_unix {
            return None;
        }

        let output = capture_stdout(&settings.tools.gitversion, &["/output", "json"], root)?;
        Self::from_json(&output).ok()
    }

    /// Parse GitVersion's JSON output
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
