//! Build parameters
//!
//! Parameters arrive as raw strings from the command line or the environment
//! and are resolved exactly once into [`Parameters`], before any target runs.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Canonical parameter names, as used on the command line and in guards
pub const CONFIGURATION: &str = "configuration";
pub const COVER: &str = "cover";
pub const NUGET_KEY: &str = "nuget-key";
pub const SONAR_KEY: &str = "sonar-key";
pub const SONAR_PROJECT_KEY: &str = "sonar-project-key";

/// Build configuration passed to the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    Debug,
    Release,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Configuration::Debug => write!(f, "Debug"),
            Configuration::Release => write!(f, "Release"),
        }
    }
}

impl FromStr for Configuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "release" => Ok(Configuration::Release),
            _ => Err(ConfigError::InvalidParameter {
                name: CONFIGURATION.to_string(),
                error: format!("expected Debug or Release, got '{}'", s),
            }),
        }
    }
}

/// Where the build is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildHost {
    Local,
    GitHubActions,
    AzurePipelines,
    AppVeyor,
    Travis,
    GitLab,
    Jenkins,
    TeamCity,
    /// Some CI server that only sets `CI`
    Generic,
}

/// Environment variables identifying each CI server, checked in order
const HOST_VARIABLES: &[(&str, BuildHost)] = &[
    ("GITHUB_ACTIONS", BuildHost::GitHubActions),
    ("TF_BUILD", BuildHost::AzurePipelines),
    ("APPVEYOR", BuildHost::AppVeyor),
    ("TRAVIS", BuildHost::Travis),
    ("GITLAB_CI", BuildHost::GitLab),
    ("JENKINS_URL", BuildHost::Jenkins),
    ("TEAMCITY_VERSION", BuildHost::TeamCity),
    ("CI", BuildHost::Generic),
];

impl BuildHost {
    /// Detect the build host from the process environment
    pub fn detect() -> Self {
        Self::detect_with(|name| env::var(name).ok())
    }

    /// Detect the build host using a custom variable lookup
    pub fn detect_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        HOST_VARIABLES
            .iter()
            .find(|(name, _)| {
                lookup(name)
                    .map(|v| !v.is_empty() && !v.eq_ignore_ascii_case("false"))
                    .unwrap_or(false)
            })
            .map(|(_, host)| *host)
            .unwrap_or(BuildHost::Local)
    }

    pub fn is_local(&self) -> bool {
        *self == BuildHost::Local
    }
}

impl fmt::Display for BuildHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildHost::Local => "local",
            BuildHost::GitHubActions => "GitHub Actions",
            BuildHost::AzurePipelines => "Azure Pipelines",
            BuildHost::AppVeyor => "AppVeyor",
            BuildHost::Travis => "Travis CI",
            BuildHost::GitLab => "GitLab CI",
            BuildHost::Jenkins => "Jenkins",
            BuildHost::TeamCity => "TeamCity",
            BuildHost::Generic => "CI server",
        };
        write!(f, "{}", name)
    }
}

/// Raw parameter values as received from the command line or environment
#[derive(Debug, Clone, Default)]
pub struct ParameterInputs {
    pub configuration: Option<String>,
    pub cover: Option<String>,
    pub nuget_key: Option<String>,
    pub sonar_key: Option<String>,
    pub sonar_project_key: Option<String>,
}

/// Resolved build parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub configuration: Configuration,
    pub cover: bool,
    pub nuget_key: Option<String>,
    pub sonar_key: Option<String>,
    pub sonar_project_key: Option<String>,
}

impl Parameters {
    /// Resolve raw inputs, applying defaults that depend on the build host
    pub fn resolve(inputs: ParameterInputs, host: BuildHost) -> ConfigResult<Self> {
        let configuration = match non_empty(inputs.configuration) {
            Some(value) => value.parse()?,
            None if host.is_local() => Configuration::Debug,
            None => Configuration::Release,
        };

        let cover = match non_empty(inputs.cover) {
            Some(value) => parse_bool(COVER, &value)?,
            None => true,
        };

        Ok(Parameters {
            configuration,
            cover,
            nuget_key: non_empty(inputs.nuget_key),
            sonar_key: non_empty(inputs.sonar_key),
            sonar_project_key: non_empty(inputs.sonar_project_key),
        })
    }

    /// Look up a parameter value by its canonical name
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            CONFIGURATION => Some(self.configuration.to_string()),
            COVER => Some(self.cover.to_string()),
            NUGET_KEY => self.nuget_key.clone(),
            SONAR_KEY => self.sonar_key.clone(),
            SONAR_PROJECT_KEY => self.sonar_project_key.clone(),
            _ => None,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            configuration: Configuration::Debug,
            cover: true,
            nuget_key: None,
            sonar_key: None,
            sonar_project_key: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidParameter {
            name: name.to_string(),
            error: format!("expected true or false, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_default_depends_on_host() {
        let local = Parameters::resolve(ParameterInputs::default(), BuildHost::Local).unwrap();
        assert_eq!(local.configuration, Configuration::Debug);

        let server =
            Parameters::resolve(ParameterInputs::default(), BuildHost::AppVeyor).unwrap();
        assert_eq!(server.configuration, Configuration::Release);
    }

    #[test]
    fn test_explicit_configuration_wins() {
        let inputs = ParameterInputs {
            configuration: Some("release".to_string()),
            ..Default::default()
        };
        let params = Parameters::resolve(inputs, BuildHost::Local).unwrap();
        assert_eq!(params.configuration, Configuration::Release);
    }

    #[test]
    fn test_malformed_configuration() {
        let inputs = ParameterInputs {
            configuration: Some("Staging".to_string()),
            ..Default::default()
        };
        let result = Parameters::resolve(inputs, BuildHost::Local);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name, .. }) if name == CONFIGURATION
        ));
    }

    #[test]
    fn test_cover_parsing() {
        let inputs = ParameterInputs {
            cover: Some("false".to_string()),
            ..Default::default()
        };
        let params = Parameters::resolve(inputs, BuildHost::Local).unwrap();
        assert!(!params.cover);

        let inputs = ParameterInputs {
            cover: Some("maybe".to_string()),
            ..Default::default()
        };
        assert!(Parameters::resolve(inputs, BuildHost::Local).is_err());
    }

    #[test]
    fn test_empty_key_is_absent() {
        let inputs = ParameterInputs {
            nuget_key: Some("  ".to_string()),
            sonar_key: Some("abc".to_string()),
            ..Default::default()
        };
        let params = Parameters::resolve(inputs, BuildHost::Local).unwrap();
        assert_eq!(params.get(NUGET_KEY), None);
        assert_eq!(params.get(SONAR_KEY), Some("abc".to_string()));
    }

    #[test]
    fn test_get_unknown_parameter() {
        assert_eq!(Parameters::default().get("solution"), None);
        assert_eq!(
            Parameters::default().get(CONFIGURATION),
            Some("Debug".to_string())
        );
    }

    #[test]
    fn test_detect_host() {
        let host = BuildHost::detect_with(|name| match name {
            "TF_BUILD" => Some("True".to_string()),
            "CI" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(host, BuildHost::AzurePipelines);

        let host = BuildHost::detect_with(|name| match name {
            "CI" => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(host, BuildHost::Local);
    }
}
