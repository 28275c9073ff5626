//! The destination seam the reconciler drives.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::DestinationConfig;
use crate::descriptor::RepositoryDescriptor;
use crate::error::Result;
use crate::git_config;
use crate::gitea::GiteaClient;

/// Operations a mirror destination must support
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Destination: Send + Sync {
    /// Whether `owner/name` already exists
    async fn exists(&self, owner: &str, name: &str) -> Result<bool>;

    /// Create a new mirror; `AlreadyExists` on conflict
    async fn migrate(&self, repo: &RepositoryDescriptor) -> Result<()>;

    /// Bring the stored upstream credentials in line with `repo`.
    /// Returns whether anything changed.
    async fn rotate_credentials(&self, repo: &RepositoryDescriptor) -> Result<bool>;

    /// Trigger an immediate pull from upstream
    async fn mirror_sync(&self, owner: &str, name: &str) -> Result<()>;
}

/// A Gitea instance reached over HTTP, with its data root mounted locally
#[derive(Debug, Clone)]
pub struct GiteaDestination {
    client: GiteaClient,
    data_root: PathBuf,
}

impl GiteaDestination {
    pub fn new(config: &DestinationConfig) -> Result<Self> {
        Ok(Self {
            client: GiteaClient::new(config)?,
            data_root: PathBuf::from(&config.data_path),
        })
    }

    #[cfg(test)]
    pub(crate) fn data_root(&self) -> &std::path::Path {
        &self.data_root
    }
}

#[async_trait]
impl Destination for GiteaDestination {
    async fn exists(&self, owner: &str, name: &str) -> Result<bool> {
        self.client.exists(owner, name).await
    }

    async fn migrate(&self, repo: &RepositoryDescriptor) -> Result<()> {
        self.client.migrate(repo).await
    }

    async fn rotate_credentials(&self, repo: &RepositoryDescriptor) -> Result<bool> {
        git_config::rotate_credentials(&self.data_root, repo)
    }

    async fn mirror_sync(&self, owner: &str, name: &str) -> Result<()> {
        self.client.mirror_sync(owner, name).await
    }
}
