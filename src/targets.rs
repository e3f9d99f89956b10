//! The build definition
//!
//! Declares the targets of a .NET library build: clean, restore, compile,
//! test with coverage, pack, publish to NuGet, and a Sonar analysis wrapped
//! around compile and test. `CI` ties them together.

use crate::error::{ConfigResult, ExecutionError, ExecutionResult};
use crate::runner::{
    dotnet, execute_tool, execute_with_retry, parameters, Guard, RunContext, Target,
    TargetRegistry,
};
use crate::utils;
use std::path::PathBuf;
use std::time::Duration;

pub const CLEAN: &str = "Clean";
pub const RESTORE: &str = "Restore";
pub const COMPILE: &str = "Compile";
pub const SONAR_BEGIN: &str = "SonarBegin";
pub const SONAR_END: &str = "SonarEnd";
pub const TEST: &str = "Test";
pub const PACK: &str = "Pack";
pub const PUBLISH: &str = "Publish";
pub const CI: &str = "CI";

/// Base delay between package push attempts; grows with each attempt
const PUSH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Build the registry of all targets
pub fn registry() -> ConfigResult<TargetRegistry> {
    let mut registry = TargetRegistry::new();

    registry.register(
        Target::new(CLEAN)
            .description("Remove build outputs and empty the artifacts directory")
            .before(&[RESTORE])
            .executes(clean),
    )?;

    registry.register(
        Target::new(RESTORE)
            .description("Restore NuGet dependencies")
            .executes(restore),
    )?;

    registry.register(
        Target::new(COMPILE)
            .description("Build the solution")
            .depends_on(&[RESTORE])
            .executes(compile),
    )?;

    registry.register(
        Target::new(SONAR_BEGIN)
            .description("Start a SonarCloud analysis")
            .before(&[COMPILE])
            .requires(Guard::parameter_set(parameters::SONAR_KEY))
            .unlisted()
            .executes(sonar_begin),
    )?;

    registry.register(
        Target::new(SONAR_END)
            .description("Finish the SonarCloud analysis and upload results")
            .after(&[TEST])
            .depends_on(&[SONAR_BEGIN])
            .requires(Guard::parameter_set(parameters::SONAR_KEY))
            .unlisted()
            .executes(sonar_end),
    )?;

    registry.register(
        Target::new(TEST)
            .description("Run the test project with coverage")
            .depends_on(&[COMPILE])
            .executes(test),
    )?;

    registry.register(
        Target::new(PACK)
            .description("Create NuGet packages")
            .after(&[TEST])
            .only_when(Guard::OnMainBranch)
            .executes(pack),
    )?;

    registry.register(
        Target::new(PUBLISH)
            .description("Push packages to the NuGet feed")
            .depends_on(&[PACK])
            .requires(Guard::parameter_set(parameters::NUGET_KEY))
            .requires(Guard::parameter_equals(parameters::CONFIGURATION, "Release"))
            .only_when(Guard::OnMainBranch)
            .executes(publish),
    )?;

    registry.register(
        Target::new(CI)
            .description("Full continuous integration build")
            .depends_on(&[CLEAN, TEST, SONAR_END, PUBLISH]),
    )?;

    registry.validate()?;
    Ok(registry)
}

fn clean(ctx: &RunContext) -> ExecutionResult<()> {
    for base in [ctx.source_dir(), ctx.tests_dir()] {
        for dir in utils::glob_directories(&base, &["**/bin", "**/obj"])? {
            ctx.print_debug(&format!("Deleting {}", dir.display()));
            if !ctx.dry_run {
                utils::delete_directory(&dir)?;
            }
        }
    }

    let artifacts = ctx.artifacts_dir();
    ctx.print_debug(&format!("Cleaning {}", artifacts.display()));
    if !ctx.dry_run {
        utils::ensure_clean_directory(&artifacts)?;
    }
    Ok(())
}

fn restore(ctx: &RunContext) -> ExecutionResult<()> {
    let solution = solution(ctx)?;
    execute_tool(&dotnet::restore(&ctx.settings.tools.dotnet, &solution), ctx)
}

fn compile(ctx: &RunContext) -> ExecutionResult<()> {
    let solution = solution(ctx)?;
    if ctx.version.is_none() {
        ctx.print_debug("No version information; building without version properties");
    }
    let cmd = dotnet::build(
        &ctx.settings.tools.dotnet,
        &solution,
        ctx.parameters.configuration,
        ctx.version.as_ref(),
    );
    execute_tool(&cmd, ctx)
}

fn sonar_begin(ctx: &RunContext) -> ExecutionResult<()> {
    let login = ctx.parameters.sonar_key.as_deref().unwrap_or_default();
    let report = ctx.artifacts_dir().join("coverage.opencover.xml");
    let settings = dotnet::SonarBegin {
        login,
        project_key: ctx.parameters.sonar_project_key.as_deref(),
        organization: &ctx.settings.sonar.organization,
        server: &ctx.settings.sonar.server,
        version: ctx.version.as_ref().map(|v| v.nuget_version_v2.as_str()),
        opencover_report: &report,
    };
    execute_tool(&dotnet::sonar_begin(&ctx.settings.tools.dotnet, &settings), ctx)
}

fn sonar_end(ctx: &RunContext) -> ExecutionResult<()> {
    let login = ctx.parameters.sonar_key.as_deref().unwrap_or_default();
    execute_tool(&dotnet::sonar_end(&ctx.settings.tools.dotnet, login), ctx)
}

fn test(ctx: &RunContext) -> ExecutionResult<()> {
    let project = test_project(ctx)?;
    let output = ctx.artifacts_dir().join("coverage");
    let coverage = dotnet::Coverage {
        enabled: ctx.parameters.cover,
        output: &output,
        format: &ctx.settings.coverage.format,
        exclude: &ctx.settings.coverage.exclude,
    };
    let cmd = dotnet::test(
        &ctx.settings.tools.dotnet,
        &project,
        ctx.parameters.configuration,
        &coverage,
    );
    execute_tool(&cmd, ctx)
}

fn pack(ctx: &RunContext) -> ExecutionResult<()> {
    let solution = solution(ctx)?;
    let cmd = dotnet::pack(
        &ctx.settings.tools.dotnet,
        &solution,
        ctx.parameters.configuration,
        &ctx.artifacts_dir(),
        ctx.version.as_ref(),
    );
    execute_tool(&cmd, ctx)
}

fn publish(ctx: &RunContext) -> ExecutionResult<()> {
    let packages = utils::glob_files(&ctx.artifacts_dir(), "*.nupkg")?;
    if packages.is_empty() && !ctx.dry_run {
        return Err(ExecutionError::NoMatch(
            ctx.artifacts_dir().join("*.nupkg").display().to_string(),
        ));
    }

    ctx.print_info(&format!(
        "Pushing {} package(s) to {}",
        packages.len(),
        ctx.settings.nuget.source
    ));

    let api_key = ctx.parameters.nuget_key.as_deref().unwrap_or_default();
    let policy = &ctx.settings.publish;
    let mut failed = Vec::new();

    for package in &packages {
        let cmd = dotnet::nuget_push(
            &ctx.settings.tools.dotnet,
            package,
            api_key,
            &ctx.settings.nuget.source,
            policy.skip_duplicate,
        );

        if let Err(e) = execute_with_retry(&cmd, ctx, policy.retries, PUSH_RETRY_DELAY) {
            if !policy.continue_on_failure {
                return Err(e);
            }
            ctx.print_error(&e.to_string());
            failed.push(package);
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(ExecutionError::PushFailed {
            failed: failed.len(),
            total: packages.len(),
            packages: failed
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// The configured solution, or the single `*.sln` in the root
fn solution(ctx: &RunContext) -> ExecutionResult<PathBuf> {
    if let Some(solution) = &ctx.settings.solution {
        return Ok(ctx.root.join(solution));
    }

    let mut found = utils::glob_files(&ctx.root, "*.sln")?;
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(ExecutionError::NoMatch(
            ctx.root.join("*.sln").display().to_string(),
        )),
        _ => Err(ExecutionError::Pattern {
            pattern: "*.sln".to_string(),
            error: format!(
                "{} solutions found; set `solution` in ubuild.yml",
                found.len()
            ),
        }),
    }
}

/// The first project under the tests directory matching `test_project`
fn test_project(ctx: &RunContext) -> ExecutionResult<PathBuf> {
    let pattern = &ctx.settings.test_project;
    utils::glob_files(&ctx.tests_dir(), pattern)?
        .into_iter()
        .next()
        .ok_or_else(|| ExecutionError::NoMatch(ctx.tests_dir().join(pattern).display().to_string()))
}
