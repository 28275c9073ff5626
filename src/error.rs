//! Error types for discovery and mirror reconciliation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering or reconciling mirrors.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A required configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// GitHub API call failed.
    #[error("GitHub error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// The destination answered with a status the caller does not handle.
    #[error("unexpected status {status} from {operation}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    /// The destination already has a repository under this owner/name.
    #[error("repository with the same name already exists")]
    AlreadyExists,

    /// The destination refused the migration.
    #[error("{0}")]
    Migration(String),

    /// The mirror's git config file could not be read.
    #[error("git config not found at {}: {source}", path.display())]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The git config has no `[remote "origin"]` url entry.
    #[error("origin url not found in {}", path.display())]
    OriginNotFound { path: PathBuf },

    /// The stored origin url does not parse.
    #[error("invalid origin url {url:?}: {source}")]
    InvalidOriginUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The stored origin url cannot carry credentials (e.g. `file:` urls).
    #[error("origin url {0:?} cannot carry credentials")]
    UrlWithoutAuthority(String),

    /// The rewritten git config could not be persisted.
    #[error("failed to write git config {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    /// Conflicts are benign: the mirror exists and the next run reconciles it.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MirrorError::AlreadyExists)
    }
}

pub type Result<T, E = MirrorError> = std::result::Result<T, E>;
