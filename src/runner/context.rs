//! Run context
//!
//! The context holds everything a target action may read: resolved parameters,
//! settings, repository and version metadata. It is built once before the plan
//! executes and is never mutated afterwards.

use crate::config::Settings;
use crate::runner::{BuildHost, Parameters, Repository, VersionInfo};
use crate::ui;
use std::path::PathBuf;

/// Resolved, read-only state for one invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Repository root; every configured path is relative to it
    pub root: PathBuf,

    pub settings: Settings,

    pub parameters: Parameters,

    pub host: BuildHost,

    pub repository: Repository,

    /// Absent when version detection is disabled or the tool is unavailable
    pub version: Option<VersionInfo>,

    pub verbosity: Verbosity,

    /// Print commands instead of running them
    pub dry_run: bool,

    /// Targets skipped from the command line
    pub skip: Vec<String>,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl RunContext {
    /// Create a context rooted at `root` with default settings and parameters
    pub fn new(root: PathBuf) -> Self {
        RunContext {
            root,
            settings: Settings::default(),
            parameters: Parameters::default(),
            host: BuildHost::Local,
            repository: Repository::default(),
            version: None,
            verbosity: Verbosity::Normal,
            dry_run: false,
            skip: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_host(mut self, host: BuildHost) -> Self {
        self.host = host;
        self
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_version(mut self, version: Option<VersionInfo>) -> Self {
        self.version = version;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_skip(mut self, skip: Vec<String>) -> Self {
        self.skip = skip;
        self
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.settings.source_dir)
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.root.join(&self.settings.tests_dir)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join(&self.settings.artifacts_dir)
    }

    /// Whether the current branch is one of the configured main branches
    pub fn is_on_main_branch(&self) -> bool {
        self.repository.is_on_branch(&self.settings.main_branches)
    }

    /// Whether a target was skipped on the command line
    pub fn is_skipped(&self, target: &str) -> bool {
        self.skip.iter().any(|s| s.eq_ignore_ascii_case(target))
    }


    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", ui::info_prefix(), message);
        }
    }

    /// Print warning message
    pub fn print_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", ui::warn_prefix(), message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", ui::error_prefix(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", ui::debug_prefix(), message);
        }
    }

    /// Print a command line about to run
    pub fn print_command(&self, command_line: &str) {
        if self.verbosity >= Verbosity::Normal {
            let prefix = if self.dry_run {
                ui::dry_run_prefix()
            } else {
                ui::run_prefix()
            };
            eprintln!("{} {}", prefix, command_line);
        }
    }

    /// Print target start banner
    pub fn print_target_start(&self, target: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", ui::target_banner(target));
        }
    }

    /// Print target skip message
    pub fn print_target_skip(&self, target: &str, reason: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}: {}", ui::skip_prefix(), target, reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Parameters;

    #[test]
    fn test_context_new() {
        let ctx = RunContext::new(PathBuf::from("/repo"));
        assert_eq!(ctx.verbosity, Verbosity::Normal);
        assert_eq!(ctx.host, BuildHost::Local);
        assert!(!ctx.dry_run);
        assert!(ctx.version.is_none());
    }

    #[test]
    fn test_directories_are_rooted() {
        let ctx = RunContext::new(PathBuf::from("/repo"));
        assert_eq!(ctx.source_dir(), PathBuf::from("/repo/src"));
        assert_eq!(ctx.tests_dir(), PathBuf::from("/repo/tests"));
        assert_eq!(ctx.artifacts_dir(), PathBuf::from("/repo/artifacts"));
    }

    #[test]
    fn test_main_branch_detection() {
        let ctx = RunContext::new(PathBuf::from("/repo"))
            .with_repository(Repository::on_branch("master"));
        assert!(ctx.is_on_main_branch());

        let ctx = ctx.with_repository(Repository::on_branch("feature/login"));
        assert!(!ctx.is_on_main_branch());
    }

    #[test]
    fn test_skip_is_case_insensitive() {
        let ctx = RunContext::new(PathBuf::from("/repo")).with_skip(vec!["clean".to_string()]);
        assert!(ctx.is_skipped("Clean"));
        assert!(!ctx.is_skipped("Restore"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }
}
