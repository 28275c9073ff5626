//! reflectory - mirror GitHub and GitLab repositories into Gitea
//!
//! Discovers the repositories a user owns on each configured source platform
//! and makes sure every one of them has a pull mirror on a Gitea instance.
//! Existing mirrors get their stored upstream credentials refreshed when a
//! token rotates, followed by an immediate sync.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and parsing
//! - [`discovery`]: Provider-agnostic discovery, with [`github`] and [`gitlab`] collectors
//! - [`gitea`]: Gitea API client (existence probe, migration, mirror sync)
//! - [`git_config`]: In-place credential rotation of a mirror's git config
//! - [`reconcile`]: The per-repository migrate / rotate / sync state machine

pub mod config;
pub mod descriptor;
pub mod destination;
pub mod discovery;
pub mod error;
pub mod git_config;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod reconcile;

pub use config::Config;
pub use descriptor::{MirrorKey, RepositoryDescriptor};
pub use destination::{Destination, GiteaDestination};
pub use discovery::{build_source, Discovery, MultiDiscovery};
pub use error::MirrorError;
pub use gitea::GiteaClient;
pub use reconcile::{MirrorOutcome, PlannedAction, ReconcileSummary, Reconciler};
