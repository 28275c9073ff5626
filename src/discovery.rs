//! Repository discovery abstraction layer
//!
//! Every source platform implements [`Discovery`] and hands back
//! [`RepositoryDescriptor`]s; nothing downstream knows which platform a
//! descriptor came from. Adding a platform means adding a [`SourceKind`]
//! variant and an implementation, not branching in the orchestrator.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;

use crate::config::{SourceConfig, SourceKind};
use crate::descriptor::RepositoryDescriptor;
use crate::error::{MirrorError, Result};
use crate::github::GitHubSource;
use crate::gitlab::GitLabSource;

/// Page size used by every collector
pub const PAGE_SIZE: u8 = 100;

/// Trait for repository discovery from various providers
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Drain every page of the provider and return the descriptors
    async fn export(&self) -> Result<Vec<RepositoryDescriptor>>;

    /// Provider name for display/logging
    fn provider_name(&self) -> &'static str;
}

/// The account-level settings every descriptor of one source shares
#[derive(Debug, Clone)]
pub struct SourceAccount {
    pub user: String,
    pub api_key: String,
    pub dest_owner: String,
    pub dest_name_prefix: String,
}

impl SourceAccount {
    /// Validate the fields every platform needs
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(MirrorError::Configuration("url is not defined".to_string()));
        }
        if config.user.is_empty() {
            return Err(MirrorError::Configuration("user is not defined".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(MirrorError::Configuration("api key is not defined".to_string()));
        }
        if config.dest_owner.is_empty() {
            return Err(MirrorError::Configuration("dest owner is not defined".to_string()));
        }

        Ok(Self {
            user: config.user.clone(),
            api_key: config.api_key.clone(),
            dest_owner: config.dest_owner.clone(),
            dest_name_prefix: config.dest_name_prefix.clone(),
        })
    }

    /// Build the descriptor for one upstream repository
    pub fn describe(&self, name: &str, clone_url: &str) -> RepositoryDescriptor {
        RepositoryDescriptor {
            name: name.to_string(),
            clone_url: clone_url.to_string(),
            clone_username: self.user.clone(),
            clone_password: self.api_key.clone(),
            destination_owner: self.dest_owner.clone(),
            destination_name: format!("{}{}", self.dest_name_prefix, name),
        }
    }
}

/// Instantiate the collector for one configured source. `timeout`
/// bounds each HTTP request the collector makes.
pub fn build_source(config: &SourceConfig, timeout: Duration) -> Result<Box<dyn Discovery>> {
    match config.kind {
        SourceKind::Github => Ok(Box::new(GitHubSource::new(config, timeout)?)),
        SourceKind::Gitlab => Ok(Box::new(GitLabSource::new(config, timeout)?)),
        SourceKind::Unknown => Err(MirrorError::Configuration(
            "unknown source type".to_string(),
        )),
    }
}

/// Aggregates multiple discovery sources
pub struct MultiDiscovery {
    sources: Vec<Box<dyn Discovery>>,
}

impl MultiDiscovery {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: Box<dyn Discovery>) {
        self.sources.push(source);
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Discover from all sources concurrently. Results keep source order;
    /// a failing source is logged and contributes nothing.
    pub async fn discover_all(&self) -> Vec<RepositoryDescriptor> {
        let exports = join_all(self.sources.iter().map(|source| source.export())).await;

        let mut all_repos = Vec::new();
        for (source, result) in self.sources.iter().zip(exports) {
            match result {
                Ok(repos) => {
                    tracing::info!(
                        "Discovered {} repositories from {}",
                        repos.len(),
                        source.provider_name()
                    );
                    all_repos.extend(repos);
                }
                Err(e) => {
                    tracing::error!(
                        "unable to export {} repositories: {}",
                        source.provider_name(),
                        e
                    );
                }
            }
        }

        all_repos
    }
}

impl Default for MultiDiscovery {
    fn default() -> Self {
        Self::new()
    }
}
