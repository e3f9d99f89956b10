//! Toolchain command builders
//!
//! Pure argument assembly for the `dotnet` CLI and the Sonar scanner global
//! tool. Nothing here runs a process.

use crate::runner::{Configuration, ToolCommand, VersionInfo};
use std::path::Path;

/// `dotnet restore <solution>`
pub fn restore(dotnet: &str, solution: &Path) -> ToolCommand {
    ToolCommand::new(dotnet)
        .arg("restore")
        .arg(path_arg(solution))
}

/// `dotnet build`, stamping version properties when they are known
pub fn build(
    dotnet: &str,
    solution: &Path,
    configuration: Configuration,
    version: Option<&VersionInfo>,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(dotnet)
        .arg("build")
        .arg(path_arg(solution))
        .option("--configuration", configuration.to_string())
        .arg("--no-restore");

    if let Some(version) = version {
        cmd = cmd
            .property("AssemblyVersion", &version.assembly_sem_ver)
            .property("FileVersion", &version.assembly_sem_file_ver)
            .property("InformationalVersion", &version.informational_version);
    }

    cmd
}

/// Coverage collection options for [`test`]
#[derive(Debug, Clone)]
pub struct Coverage<'a> {
    pub enabled: bool,
    /// Output path without extension; the format is appended by coverlet
    pub output: &'a Path,
    pub format: &'a str,
    pub exclude: &'a str,
}

/// `dotnet test` on an already built project with coverlet properties
pub fn test(
    dotnet: &str,
    project: &Path,
    configuration: Configuration,
    coverage: &Coverage<'_>,
) -> ToolCommand {
    ToolCommand::new(dotnet)
        .arg("test")
        .arg(path_arg(project))
        .arg("--no-build")
        .option("--configuration", configuration.to_string())
        .property("CollectCoverage", coverage.enabled)
        .property("CoverletOutput", coverage.output.display())
        .property("CoverletOutputFormat", coverage.format)
        .property("Exclude", coverage.exclude)
}

/// `dotnet pack` into the artifacts directory
pub fn pack(
    dotnet: &str,
    solution: &Path,
    configuration: Configuration,
    output: &Path,
    version: Option<&VersionInfo>,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(dotnet)
        .arg("pack")
        .arg(path_arg(solution))
        .arg("--no-build")
        .option("--configuration", configuration.to_string())
        .option("--output", path_arg(output));

    if let Some(version) = version {
        cmd = cmd.property("Version", &version.nuget_version_v2);
    }

    cmd
}

/// `dotnet nuget push` for a single package
pub fn nuget_push(
    dotnet: &str,
    package: &Path,
    api_key: &str,
    source: &str,
    skip_duplicate: bool,
) -> ToolCommand {
    let cmd = ToolCommand::new(dotnet)
        .arg("nuget")
        .arg("push")
        .arg(path_arg(package))
        .secret_option("--api-key", api_key)
        .option("--source", source);

    if skip_duplicate {
        cmd.arg("--skip-duplicate")
    } else {
        cmd
    }
}

/// Arguments for starting a Sonar analysis
#[derive(Debug, Clone)]
pub struct SonarBegin<'a> {
    pub login: &'a str,
    pub project_key: Option<&'a str>,
    pub organization: &'a str,
    pub server: &'a str,
    pub version: Option<&'a str>,
    pub opencover_report: &'a Path,
}

/// `dotnet sonarscanner begin`
pub fn sonar_begin(dotnet: &str, settings: &SonarBegin<'_>) -> ToolCommand {
    let mut cmd = ToolCommand::new(dotnet).arg("sonarscanner").arg("begin");

    if let Some(key) = settings.project_key {
        cmd = cmd.arg(format!("/k:{}", key));
    }
    cmd = cmd
        .arg(format!("/o:{}", settings.organization))
        .arg(format!("/d:sonar.host.url={}", settings.server))
        .secret_arg("/d:sonar.login=", settings.login);

    if let Some(version) = settings.version {
        cmd = cmd.arg(format!("/v:{}", version));
    }

    cmd.arg(format!(
        "/d:sonar.cs.opencover.reportsPaths={}",
        settings.opencover_report.display()
    ))
}

/// `dotnet sonarscanner end`
pub fn sonar_end(dotnet: &str, login: &str) -> ToolCommand {
    ToolCommand::new(dotnet)
        .arg("sonarscanner")
        .arg("end")
        .secret_arg("/d:sonar.login=", login)
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
