//! Run configuration: a TOML file overlaid with environment variables.

mod env;

use crate::Result;
use crate::providers::ProviderName;
use crate::reports::WeightFilter;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the current directory when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "contribkit.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Token shared by every provider that does not set its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Login shared by every provider that does not set its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    /// Providers to run; guessed from the other settings when empty
    #[serde(default)]
    pub providers: Vec<ProviderName>,

    /// Stem of the output file
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,

    /// Weight threshold applied before output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<WeightFilter>,

    #[serde(default)]
    pub github_contributions: GithubContributionsConfig,

    #[serde(default)]
    pub github_contributors: GithubContributorsConfig,

    #[serde(default)]
    pub gitlab_contributors: GitlabContributorsConfig,

    #[serde(default)]
    pub crowdin_contributors: CrowdinContributorsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubContributionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Upper bound on any single owner's weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_contributions: Option<f64>,

    pub logarithmic_scaling: bool,
    pub max_search_pages: usize,
    pub batch_size: usize,
}

impl Default for GithubContributionsConfig {
    fn default() -> Self {
        Self {
            login: None,
            token: None,
            max_contributions: None,
            logarithmic_scaling: false,
            max_search_pages: 10,
            batch_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubContributorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    pub min_contributions: u64,
}

impl Default for GithubContributorsConfig {
    fn default() -> Self {
        Self {
            login: None,
            token: None,
            repo: None,
            min_contributions: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitlabContributorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Numeric GitLab project id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<u64>,

    pub min_contributions: u64,
}

impl Default for GitlabContributorsConfig {
    fn default() -> Self {
        Self {
            token: None,
            repo_id: None,
            min_contributions: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrowdinContributorsConfig {
    /// Crowdin personal access token; the shared `token` is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Numeric Crowdin project id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,

    /// Translators need strictly more translated words than this to be listed
    pub min_translations: u64,
}

impl Default for CrowdinContributorsConfig {
    fn default() -> Self {
        Self {
            token: None,
            project_id: None,
            min_translations: 1,
        }
    }
}

fn default_name() -> String {
    "sponsors".to_string()
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("./contribkit")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            login: None,
            providers: Vec::new(),
            name: default_name(),
            output_dir: default_output_dir(),
            filter: None,
            github_contributions: GithubContributionsConfig::default(),
            github_contributors: GithubContributorsConfig::default(),
            gitlab_contributors: GitlabContributorsConfig::default(),
            crowdin_contributors: CrowdinContributorsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without `config_path`, `contribkit.toml` in `base_dir` is used if it exists.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading contribkit configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading contribkit configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let contributions = &self.github_contributions;

        if contributions.batch_size == 0 {
            return Err(app_err!("github_contributions.batch_size must be at least 1"));
        }

        if contributions.max_search_pages == 0 {
            return Err(app_err!("github_contributions.max_search_pages must be at least 1"));
        }

        if let Some(max) = contributions.max_contributions
            && (max.is_nan() || max < 0.0)
        {
            return Err(app_err!("github_contributions.max_contributions must not be negative, got {max}"));
        }

        if self.name.is_empty() {
            return Err(app_err!("name must not be empty"));
        }

        Ok(())
    }
}
