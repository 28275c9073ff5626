use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::descriptor::RepositoryDescriptor;
use crate::discovery::{Discovery, SourceAccount, PAGE_SIZE};
use crate::error::{MirrorError, Result};
use crate::gitea::build_http_client;

/// GitLab source: every project the token's user owns
pub struct GitLabSource {
    http: Client,
    host: String,
    account: SourceAccount,
}

/// The fields of a GitLab project we use
#[derive(Debug, Deserialize)]
struct GitLabProject {
    name: String,
    http_url_to_repo: String,
}

impl GitLabSource {
    pub fn new(config: &SourceConfig, timeout: Duration) -> Result<Self> {
        let account = SourceAccount::from_config(config)?;
        let http = build_http_client(timeout)?;

        Ok(Self {
            http,
            host: config.url.trim_end_matches('/').to_string(),
            account,
        })
    }

    async fn list_projects(&self, page: u32) -> Result<Vec<GitLabProject>> {
        debug!("Querying GitLab page {}...", page);

        let url = format!("{}/api/v4/projects", self.host);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("private_token", self.account.api_key.as_str()),
                ("owned", "1"),
            ])
            .query(&[("page", page), ("per_page", u32::from(PAGE_SIZE))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::UnexpectedStatus {
                operation: "GitLab project listing",
                status: status.as_u16(),
            });
        }

        let projects: Vec<GitLabProject> = response.json().await?;
        debug!("Found GitLab projects: {}", projects.len());

        Ok(projects)
    }
}

#[async_trait]
impl Discovery for GitLabSource {
    async fn export(&self) -> Result<Vec<RepositoryDescriptor>> {
        let mut repos = Vec::new();
        let mut page = 1u32;

        loop {
            let projects = self.list_projects(page).await?;
            if projects.is_empty() {
                break;
            }

            repos.extend(
                projects
                    .iter()
                    .map(|project| self.account.describe(&project.name, &project.http_url_to_repo)),
            );
            page += 1;
        }

        info!("Found {} GitLab projects", repos.len());
        Ok(repos)
    }

    fn provider_name(&self) -> &'static str {
        "GitLab"
    }
}
