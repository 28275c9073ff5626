use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for reflectory
///
/// Key names are kebab-case. The file may be YAML or JSON since YAML
/// is a superset of JSON.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Debug-level logging
    #[serde(default)]
    pub verbose: bool,

    /// Platforms to discover repositories on
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Gitea instance that hosts the mirrors
    #[serde(default)]
    pub destination: DestinationConfig,
}

/// Source platform type
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Github,
    Gitlab,
    /// Anything else; skipped with a warning
    #[serde(other)]
    Unknown,
}

/// One source platform account
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,

    /// API base URL (e.g. https://api.github.com, https://gitlab.com)
    #[serde(default)]
    pub url: String,

    /// API token, also used as the clone password
    #[serde(default)]
    pub api_key: String,

    /// Account name, also used as the clone username
    #[serde(default)]
    pub user: String,

    /// Destination namespace for repositories from this source
    #[serde(default)]
    pub dest_owner: String,

    /// Prepended to every repository name on the destination
    #[serde(default)]
    pub dest_name_prefix: String,
}

/// Destination Gitea instance
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DestinationConfig {
    /// Gitea base URL, without the /api/v1 suffix
    #[serde(default)]
    pub url: String,

    /// Gitea API token
    #[serde(default)]
    pub api_key: String,

    /// Gitea data root, containing git/repositories
    #[serde(default)]
    pub data_path: String,

    /// Timeout for every HTTP request in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            data_path: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl DestinationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Config {
    /// Resolve the configuration file: explicit path, then ./config.json,
    /// then ./config.yml, then the XDG location.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }

        for local in ["config.json", "config.yml"] {
            let candidate = PathBuf::from(local);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        Self::default_config_path()
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_values()?;

        Ok(config)
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("reflectory").join("config.yml"))
    }

    /// Expand `~` and environment variables in the data path and
    /// environment variables in API keys
    pub fn expand_values(&mut self) -> Result<()> {
        self.destination.data_path = shellexpand::full(&self.destination.data_path)
            .context("Failed to expand data-path")?
            .into_owned();

        self.destination.api_key = shellexpand::env(&self.destination.api_key)
            .context("Failed to expand destination api-key")?
            .into_owned();

        for source in &mut self.sources {
            source.api_key = shellexpand::env(&source.api_key)
                .with_context(|| format!("Failed to expand api-key for {:?} source", source.kind))?
                .into_owned();
        }

        Ok(())
    }

    /// Reject configurations that cannot discover anything
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("no sources provided");
        }
        Ok(())
    }
}
