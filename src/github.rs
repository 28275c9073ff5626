use octocrab::models::Repository;
use octocrab::Octocrab;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::descriptor::RepositoryDescriptor;
use crate::discovery::{Discovery, SourceAccount, PAGE_SIZE};
use crate::error::Result;

/// GitHub source: every repository the authenticated user owns
pub struct GitHubSource {
    client: Octocrab,
    account: SourceAccount,
}

impl GitHubSource {
    /// Create a GitHub source from its configuration.
    ///
    /// `url` is the API root (`https://api.github.com` or an Enterprise
    /// `/api/v3` endpoint). `timeout` bounds connecting to and reading
    /// from the API.
    pub fn new(config: &SourceConfig, timeout: Duration) -> Result<Self> {
        let account = SourceAccount::from_config(config)?;

        let client = Octocrab::builder()
            .base_uri(config.url.as_str())?
            .personal_token(config.api_key.clone())
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .build()?;

        Ok(Self { client, account })
    }

    /// List all repositories owned by the authenticated user
    pub async fn list_owned_repositories(&self) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        let mut page = 1u8;

        loop {
            debug!("Querying GitHub page {}...", page);

            let page_repos = self
                .client
                .current()
                .list_repos_for_authenticated_user()
                .visibility("all")
                .affiliation("owner")
                .per_page(PAGE_SIZE)
                .page(page)
                .send()
                .await?;

            let items = page_repos.items;
            debug!("Found GitHub repos: {}", items.len());

            if items.is_empty() {
                break;
            }

            repositories.extend(items);

            // octocrab takes the page number as u8
            if page == u8::MAX {
                error!(
                    "GitHub listing truncated at {} pages ({} repositories); later pages are not mirrored",
                    u8::MAX,
                    repositories.len()
                );
                break;
            }
            page += 1;
        }

        info!("Found {} GitHub repositories", repositories.len());
        Ok(repositories)
    }

    fn to_descriptor(&self, repo: &Repository) -> Option<RepositoryDescriptor> {
        match &repo.clone_url {
            Some(clone_url) => Some(self.account.describe(&repo.name, clone_url.as_str())),
            None => {
                warn!("GitHub repository {} has no clone URL, skipping", repo.name);
                None
            }
        }
    }
}

#[async_trait]
impl Discovery for GitHubSource {
    async fn export(&self) -> Result<Vec<RepositoryDescriptor>> {
        let repositories = self.list_owned_repositories().await?;

        Ok(repositories
            .iter()
            .filter_map(|repo| self.to_descriptor(repo))
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "GitHub"
    }
}
