//! Reconciler - brings each destination mirror in line with its descriptor
//!
//! Per descriptor the reconciler probes the destination, then either
//! migrates a new mirror or refreshes the credentials of an existing one,
//! triggering a sync only when the credentials actually changed.
//! Descriptors are processed one at a time: the credential rotation is a
//! read-modify-write of a file nothing else locks.

use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::descriptor::{MirrorKey, RepositoryDescriptor};
use crate::destination::Destination;
use crate::error::Result;

/// What happened to one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// A new mirror was created
    Migrated { key: MirrorKey },
    /// Migration hit an existing repository; the next run reconciles it
    Deferred { key: MirrorKey, reason: String },
    /// Credentials were rotated and a sync was triggered
    Refreshed { key: MirrorKey },
    /// The mirror exists with current credentials
    Unchanged { key: MirrorKey },
    /// Any step failed
    Failed { key: MirrorKey, error: String },
}

impl MirrorOutcome {
    #[cfg(test)]
    pub(crate) fn key(&self) -> &MirrorKey {
        match self {
            MirrorOutcome::Migrated { key }
            | MirrorOutcome::Deferred { key, .. }
            | MirrorOutcome::Refreshed { key }
            | MirrorOutcome::Unchanged { key }
            | MirrorOutcome::Failed { key, .. } => key,
        }
    }
}

/// What a run would do, as seen by the existence probe alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Migrate { key: MirrorKey },
    RefreshCredentials { key: MirrorKey },
    ProbeFailed { key: MirrorKey, error: String },
}

/// Results from a complete reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub total_repositories: usize,
    pub migrated: usize,
    pub refreshed: usize,
    pub unchanged: usize,
    pub deferred: usize,
    pub failed: usize,
    pub duration: Duration,
    pub outcomes: Vec<MirrorOutcome>,
}

impl ReconcileSummary {
    fn compile(outcomes: Vec<MirrorOutcome>, duration: Duration) -> Self {
        let mut summary = Self {
            total_repositories: outcomes.len(),
            migrated: 0,
            refreshed: 0,
            unchanged: 0,
            deferred: 0,
            failed: 0,
            duration,
            outcomes: Vec::new(),
        };

        for outcome in &outcomes {
            match outcome {
                MirrorOutcome::Migrated { .. } => summary.migrated += 1,
                MirrorOutcome::Refreshed { .. } => summary.refreshed += 1,
                MirrorOutcome::Unchanged { .. } => summary.unchanged += 1,
                MirrorOutcome::Deferred { .. } => summary.deferred += 1,
                MirrorOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        summary.outcomes = outcomes;
        summary
    }
}

/// Drives descriptors through probe → migrate | rotate → sync
pub struct Reconciler {
    destination: Box<dyn Destination>,
}

impl Reconciler {
    pub fn new(destination: Box<dyn Destination>) -> Self {
        Self { destination }
    }

    /// Reconcile every descriptor in order. Failures are recorded, never
    /// propagated, so one bad repository cannot stop the batch.
    pub async fn reconcile_all(&self, repositories: &[RepositoryDescriptor]) -> ReconcileSummary {
        let start_time = Instant::now();

        info!("Reconciling {} repositories", repositories.len());

        let mut outcomes = Vec::with_capacity(repositories.len());
        for repo in repositories {
            outcomes.push(self.reconcile_one(repo).await);
        }

        let summary = ReconcileSummary::compile(outcomes, start_time.elapsed());

        info!(
            "Reconciliation completed in {:.2}s: {} migrated, {} refreshed, {} unchanged, {} deferred, {} failed",
            summary.duration.as_secs_f64(),
            summary.migrated,
            summary.refreshed,
            summary.unchanged,
            summary.deferred,
            summary.failed
        );

        summary
    }

    /// Reconcile a single descriptor
    pub async fn reconcile_one(&self, repo: &RepositoryDescriptor) -> MirrorOutcome {
        match self.drive(repo).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let key = repo.key();
                error!("unable to mirror repository {}: {}", key, e);
                MirrorOutcome::Failed {
                    key,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn drive(&self, repo: &RepositoryDescriptor) -> Result<MirrorOutcome> {
        let key = repo.key();

        if self.destination.exists(&key.owner, &key.name).await? {
            info!("repo {} exists, checking credentials", key);

            if !self.destination.rotate_credentials(repo).await? {
                return Ok(MirrorOutcome::Unchanged { key });
            }

            info!("credentials of {} changed, triggering sync", key);
            self.destination.mirror_sync(&key.owner, &key.name).await?;
            return Ok(MirrorOutcome::Refreshed { key });
        }

        info!("repo {} does not exist, migrating", key);

        match self.destination.migrate(repo).await {
            Ok(()) => Ok(MirrorOutcome::Migrated { key }),
            Err(e) if e.is_conflict() => {
                warn!("repo {} appeared during migration, deferring to next run: {}", key, e);
                Ok(MirrorOutcome::Deferred {
                    key,
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Dry run: probe each descriptor and report what a real run would do
    pub async fn plan(&self, repositories: &[RepositoryDescriptor]) -> Vec<PlannedAction> {
        let mut actions = Vec::with_capacity(repositories.len());

        for repo in repositories {
            let key = repo.key();
            let action = match self.destination.exists(&key.owner, &key.name).await {
                Ok(true) => PlannedAction::RefreshCredentials { key },
                Ok(false) => PlannedAction::Migrate { key },
                Err(e) => {
                    warn!("unable to probe {}: {}", key, e);
                    PlannedAction::ProbeFailed {
                        key,
                        error: e.to_string(),
                    }
                }
            };
            actions.push(action);
        }

        actions
    }
}
