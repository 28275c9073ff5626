//! Platform-independent description of one repository to mirror.

use std::fmt;

/// Identifies a mirror on the destination: `(owner, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorKey {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for MirrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A repository discovered on a source platform, normalized for the reconciler.
///
/// Built once per run by a [`Discovery`](crate::discovery::Discovery)
/// implementation and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Repository name on the source platform
    pub name: String,

    /// HTTPS clone URL of the upstream, without credentials
    pub clone_url: String,

    /// Username the destination authenticates to the upstream with
    pub clone_username: String,

    /// Password or API token paired with `clone_username`
    pub clone_password: String,

    /// Namespace on the destination
    pub destination_owner: String,

    /// Repository name on the destination
    pub destination_name: String,
}

impl RepositoryDescriptor {
    /// The reconciliation key for this descriptor
    pub fn key(&self) -> MirrorKey {
        MirrorKey {
            owner: self.destination_owner.clone(),
            name: self.destination_name.clone(),
        }
    }

    /// Get display name (owner/name format) on the destination
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.destination_owner, self.destination_name)
    }
}

// Tokens must never reach the logs.
impl fmt::Debug for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryDescriptor")
            .field("name", &self.name)
            .field("clone_url", &self.clone_url)
            .field("clone_username", &self.clone_username)
            .field("clone_password", &"***")
            .field("destination_owner", &self.destination_owner)
            .field("destination_name", &self.destination_name)
            .finish()
    }
}
