//! Gitea API client for the mirror destination.
//!
//! Covers the three calls reconciliation needs: repository lookup,
//! pull-mirror migration and mirror-sync. All requests carry the static
//! API token in an `Authorization: token ...` header.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::DestinationConfig;
use crate::descriptor::RepositoryDescriptor;
use crate::error::{MirrorError, Result};

/// Detail used when a failed migration response carries no message.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Gitea API client
#[derive(Clone)]
pub struct GiteaClient {
    http: Client,
    host: String,
    token: String,
}

impl std::fmt::Debug for GiteaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClient")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /repos/migrate`
#[derive(Debug, Serialize)]
struct MigrateRequest<'a> {
    clone_addr: &'a str,
    auth_username: &'a str,
    auth_password: &'a str,
    repo_owner: &'a str,
    repo_name: &'a str,
    service: &'static str,
    mirror: bool,
    private: bool,
    issues: bool,
    labels: bool,
    milestones: bool,
    releases: bool,
    wiki: bool,
    pull_requests: bool,
}

impl<'a> MigrateRequest<'a> {
    /// Private pull mirror importing everything the upstream offers
    fn mirror_of(repo: &'a RepositoryDescriptor) -> Self {
        Self {
            clone_addr: &repo.clone_url,
            auth_username: &repo.clone_username,
            auth_password: &repo.clone_password,
            repo_owner: &repo.destination_owner,
            repo_name: &repo.destination_name,
            service: "git",
            mirror: true,
            private: true,
            issues: true,
            labels: true,
            milestones: true,
            releases: true,
            wiki: true,
            pull_requests: true,
        }
    }
}

impl GiteaClient {
    /// Create a client from the destination configuration.
    ///
    /// Fails when the URL or API key is missing.
    pub fn new(config: &DestinationConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(MirrorError::Configuration("url is not defined".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(MirrorError::Configuration("api key is not defined".to_string()));
        }

        let http = build_http_client(config.timeout())?;

        Ok(Self {
            http,
            host: config.url.trim_end_matches('/').to_string(),
            token: config.api_key.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.host, path)
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.token)
    }

    /// Check whether `owner/name` exists on the destination.
    ///
    /// Only 200 and 404 are answers; every other status is an error so a
    /// flaky destination never looks like a missing repository.
    pub async fn exists(&self, owner: &str, name: &str) -> Result<bool> {
        let url = self.endpoint(&format!("/repos/{}/{}", owner, name));
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(MirrorError::UnexpectedStatus {
                operation: "repository lookup",
                status: status.as_u16(),
            }),
        }
    }

    /// Create a private pull mirror of the descriptor's upstream.
    pub async fn migrate(&self, repo: &RepositoryDescriptor) -> Result<()> {
        let url = self.endpoint("/repos/migrate");
        debug!("POST {} for {}", url, repo.full_name());

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&MigrateRequest::mirror_of(repo))
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            StatusCode::CONFLICT => Err(MirrorError::AlreadyExists),
            _ => {
                let body = response.bytes().await?;
                Err(MirrorError::Migration(error_message(&body)))
            }
        }
    }

    /// Ask the destination to pull from the upstream now.
    ///
    /// Gitea queues the pull; success means the request was accepted.
    pub async fn mirror_sync(&self, owner: &str, name: &str) -> Result<()> {
        let url = self.endpoint(&format!("/repos/{}/{}/mirror-sync", owner, name));
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::UnexpectedStatus {
                operation: "mirror sync",
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// Shared HTTP client setup for every API this crate talks to
pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("reflectory/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(MirrorError::from)
}

/// Extract the `message` field of a Gitea error body.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}
