//! Main CLI application

use crate::config::{load_settings_auto, parse_settings_file, validate_settings, Settings};
use crate::error::{BuildError, ConfigError};
use crate::runner::{
    first_unmet, BuildHost, Executor, ParameterInputs, Parameters, Repository, RunContext,
    TargetRegistry, Verbosity, VersionInfo,
};
use crate::{targets, ui};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
    settings: Settings,
    /// Directory every configured path is relative to
    root: PathBuf,
    registry: TargetRegistry,
}

impl App {
    /// Create the app, discovering the settings file from the current directory
    pub fn new(root_override: Option<PathBuf>) -> Result<Self, BuildError> {
        let (settings, settings_path) = load_settings_auto()?;
        Self::from_settings(settings, settings_path, root_override)
    }

    /// Create the app with a specific settings file
    pub fn with_settings_file(
        path: PathBuf,
        root_override: Option<PathBuf>,
    ) -> Result<Self, BuildError> {
        let settings = parse_settings_file(&path)?;
        Self::from_settings(settings, Some(path), root_override)
    }

    fn from_settings(
        settings: Settings,
        settings_path: Option<PathBuf>,
        root_override: Option<PathBuf>,
    ) -> Result<Self, BuildError> {
        validate_settings(&settings)?;

        let root = resolve_root(root_override, settings_path.as_deref())?;
        let registry = targets::registry()?;
        let command = build_command(&registry, &settings);

        Ok(App {
            command,
            settings,
            root,
            registry,
        })
    }

    /// Run the application with the given command line arguments
    pub fn run_from(mut self, args: Vec<String>) -> Result<(), BuildError> {
        let matches = self.command.clone().get_matches_from(args);

        if let Some(shell) = matches.get_one::<Shell>("completions") {
            let name = self.command.get_name().to_string();
            clap_complete::generate(*shell, &mut self.command, name, &mut io::stdout());
            return Ok(());
        }

        if matches.get_flag("list") {
            print!(
                "{}",
                ui::target_list(self.registry.listed(), &self.settings.default_target)
            );
            return Ok(());
        }

        let requested = matches
            .get_one::<String>("target")
            .cloned()
            .unwrap_or_else(|| self.settings.default_target.clone());
        let target = self
            .registry
            .get(&requested)
            .map(|t| t.name.clone())
            .ok_or(ConfigError::TargetNotFound(requested))?;

        let ctx = self.build_context(&matches)?;
        ctx.print_debug(&format!(
            "Host: {}, branch: {} ({}), configuration: {}",
            ctx.host,
            ctx.repository.branch.as_deref().unwrap_or("<unknown>"),
            ctx.repository.commit.as_deref().unwrap_or("no commit"),
            ctx.parameters.configuration
        ));

        if matches.get_flag("plan") {
            print_plan(&self.registry, &target, &ctx)?;
            return Ok(());
        }

        Executor::new(&self.registry).run(&target, &ctx)?;
        Ok(())
    }

    /// Resolve parameters and repository metadata into the run context
    fn build_context(&self, matches: &ArgMatches) -> Result<RunContext, BuildError> {
        let host = BuildHost::detect();
        let parameters = Parameters::resolve(parameter_inputs(matches), host)?;

        let repository = Repository::detect(
            &self.root,
            &self.settings.tools.git,
            matches.get_one::<String>("branch").cloned(),
        );

        // Version numbers are only needed when something actually runs
        let version = if matches.get_flag("plan") {
            None
        } else {
            VersionInfo::detect(&self.root, &self.settings)
        };

        let skip = match matches.get_many::<String>("skip") {
            Some(values) => resolve_skip(&self.registry, values)?,
            None => Vec::new(),
        };

        Ok(RunContext::new(self.root.clone())
            .with_settings(self.settings.clone())
            .with_parameters(parameters)
            .with_host(host)
            .with_repository(repository)
            .with_version(version)
            .with_verbosity(get_verbosity(matches))
            .with_dry_run(matches.get_flag("dry-run"))
            .with_skip(skip))
    }
}

/// Build the clap command
fn build_command(registry: &TargetRegistry, settings: &Settings) -> Command {
    let target_names: Vec<String> = registry.listed().map(|t| t.name.clone()).collect();

    Command::new("ubuild")
        .version(crate::VERSION)
        .about("Target-based build automation for .NET solutions")
        .after_help(format!(
            "Targets: {}\nRun with --list for descriptions.",
            target_names.join(", ")
        ))
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help(format!(
                    "Target to run [default: {}]",
                    settings.default_target
                )),
        )
        .arg(
            Arg::new("configuration")
                .long("configuration")
                .value_name("CONFIGURATION")
                .env("CONFIGURATION")
                .help("Configuration to build - Debug (local) or Release (server) by default"),
        )
        .arg(
            Arg::new("cover")
                .long("cover")
                .value_name("BOOL")
                .env("COVER")
                .help("Collect code coverage while testing [default: true]"),
        )
        .arg(
            Arg::new("nuget-key")
                .long("nuget-key")
                .value_name("KEY")
                .env("NUGET_KEY")
                .hide_env_values(true)
                .help("API key for pushing packages"),
        )
        .arg(
            Arg::new("sonar-key")
                .long("sonar-key")
                .value_name("KEY")
                .env("SONAR_KEY")
                .hide_env_values(true)
                .help("SonarCloud login token"),
        )
        .arg(
            Arg::new("sonar-project-key")
                .long("sonar-project-key")
                .value_name("KEY")
                .env("SONAR_PROJECT_KEY")
                .help("SonarCloud project key"),
        )
        .arg(
            Arg::new("branch")
                .long("branch")
                .value_name("NAME")
                .env("UBUILD_BRANCH")
                .help("Branch name, overriding detection"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Repository root directory"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to ubuild.yml settings file"),
        )
        .arg(
            Arg::new("skip")
                .long("skip")
                .value_name("TARGETS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Targets to skip, comma separated"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List targets and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plan")
                .long("plan")
                .help("Print the execution plan and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print commands instead of running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print a shell completion script and exit"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

/// Map `--skip` values to declared target names; unknown names are errors
fn resolve_skip<'a>(
    registry: &TargetRegistry,
    names: impl Iterator<Item = &'a String>,
) -> Result<Vec<String>, ConfigError> {
    names
        .map(|name| {
            registry
                .get(name)
                .map(|t| t.name.clone())
                .ok_or_else(|| ConfigError::TargetNotFound(name.clone()))
        })
        .collect()
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Collect raw parameter values; clap has already applied environment fallbacks
fn parameter_inputs(matches: &ArgMatches) -> ParameterInputs {
    let value = |name: &str| matches.get_one::<String>(name).cloned();

    ParameterInputs {
        configuration: value("configuration"),
        cover: value("cover"),
        nuget_key: value("nuget-key"),
        sonar_key: value("sonar-key"),
        sonar_project_key: value("sonar-project-key"),
    }
}

/// Print the plan for `target`, marking targets that would be skipped
fn print_plan(registry: &TargetRegistry, target: &str, ctx: &RunContext) -> Result<(), BuildError> {
    let plan = registry.plan(target)?;

    for (i, name) in plan.targets.iter().enumerate() {
        let mut line = format!("{:>2}. {}", i + 1, name);
        if let Some(t) = registry.get(name) {
            if ctx.is_skipped(name) {
                line.push_str("  (skipped on the command line)");
            } else if let Some(guard) = first_unmet(&t.only_when, ctx) {
                line.push_str(&format!("  (skipped: requires {})", guard));
            }
        }
        println!("{}", line);
    }

    Ok(())
}

/// The root is `--root`, else the settings file's directory, else the current directory
fn resolve_root(
    root_override: Option<PathBuf>,
    settings_path: Option<&Path>,
) -> Result<PathBuf, BuildError> {
    if let Some(root) = root_override {
        return Ok(root);
    }
    if let Some(dir) = settings_path.and_then(Path::parent) {
        if !dir.as_os_str().is_empty() {
            return Ok(dir.to_path_buf());
        }
    }
    Ok(env::current_dir()?)
}

/// Load `.env` from the root; variables already set in the environment win
fn load_dotenv(root: &Path) -> Result<(), BuildError> {
    let path = root.join(".env");
    if path.is_file() {
        dotenvy::from_path(&path).map_err(|e| {
            ConfigError::Invalid(format!("Failed to load '{}': {}", path.display(), e))
        })?;
    }
    Ok(())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), BuildError> {
    let args: Vec<String> = env::args().collect();
    run_with_args(args)
}

/// Run the CLI application with explicit arguments
pub fn run_with_args(args: Vec<String>) -> Result<(), BuildError> {
    // The settings file and root decide where .env lives, and .env has to be
    // loaded before clap reads parameter environment variables
    let file_path = extract_value_arg(&args, "--file", Some("-f")).map(PathBuf::from);
    let root_override = extract_value_arg(&args, "--root", None).map(PathBuf::from);

    let app = match file_path {
        Some(path) => App::with_settings_file(path, root_override)?,
        None => App::new(root_override)?,
    };

    load_dotenv(&app.root)?;
    app.run_from(args)
}

/// Extract an option value before clap parsing, in `--opt value` or `--opt=value` form
fn extract_value_arg(args: &[String], long: &str, short: Option<&str>) -> Option<String> {
    let prefix = format!("{}=", long);
    for i in 0..args.len() {
        let arg = &args[i];
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string());
        }
        let matches = arg == long || short.map_or(false, |s| arg == s);
        if matches && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}
