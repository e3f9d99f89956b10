//! Settings types
//!
//! This module defines the data structures that represent a ubuild.yml settings file.
//! Every key is optional; a missing file is the same as an empty one.

use serde::{Deserialize, Serialize};

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Target run when none is given on the command line
    pub default_target: String,

    /// Solution file, relative to the root. Discovered when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,

    /// Directory holding the production projects
    pub source_dir: String,

    /// Directory holding the test projects
    pub tests_dir: String,

    /// Output directory for packages and coverage reports
    pub artifacts_dir: String,

    /// Glob (relative to tests_dir) selecting the test project
    pub test_project: String,

    /// Branches that count as the main branch
    pub main_branches: Vec<String>,

    pub nuget: NuGetSettings,

    pub sonar: SonarSettings,

    pub publish: PublishSettings,

    pub version: VersionSettings,

    pub tools: ToolSettings,

    pub coverage: CoverageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_target: "Test".to_string(),
            solution: None,
            source_dir: "src".to_string(),
            tests_dir: "tests".to_string(),
            artifacts_dir: "artifacts".to_string(),
            test_project: "**/*.Test.csproj".to_string(),
            main_branches: vec!["master".to_string(), "main".to_string()],
            nuget: NuGetSettings::default(),
            sonar: SonarSettings::default(),
            publish: PublishSettings::default(),
            version: VersionSettings::default(),
            tools: ToolSettings::default(),
            coverage: CoverageSettings::default(),
        }
    }
}

/// Package registry settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NuGetSettings {
    /// Push source URL
    pub source: String,
}

impl Default for NuGetSettings {
    fn default() -> Self {
        NuGetSettings {
            source: "https://api.nuget.org/v3/index.json".to_string(),
        }
    }
}

/// Static analysis scanner settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SonarSettings {
    pub organization: String,
    pub server: String,
}

impl Default for SonarSettings {
    fn default() -> Self {
        SonarSettings {
            organization: "ubiety".to_string(),
            server: "https://sonarcloud.io".to_string(),
        }
    }
}

/// Policy for pushing packages to the registry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishSettings {
    /// Additional attempts after a failed push
    pub retries: u32,

    /// Treat an already published package version as success
    pub skip_duplicate: bool,

    /// Keep pushing the remaining packages after one fails
    pub continue_on_failure: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        PublishSettings {
            retries: 5,
            skip_duplicate: true,
            continue_on_failure: true,
        }
    }
}

/// Version detection settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSettings {
    /// Run the version tool on Unix hosts as well
    pub on_unix: bool,
}

/// External tool executables
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub dotnet: String,
    pub gitversion: String,
    pub git: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        ToolSettings {
            dotnet: "dotnet".to_string(),
            gitversion: "dotnet-gitversion".to_string(),
            git: "git".to_string(),
        }
    }
}

/// Coverage collection settings passed to the test runner
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageSettings {
    /// Coverlet output format
    pub format: String,

    /// Coverlet exclusion filter
    pub exclude: String,
}

impl Default for CoverageSettings {
    fn default() -> Self {
        CoverageSettings {
            format: "opencover".to_string(),
            exclude: "[xunit.*]*".to_string(),
        }
    }
}
