//! GitLab collaborators: the group listing and the remote head lookup.
//!
//! The sync engine only sees the two traits below; [`GitLabClient`]
//! implements both against the REST API.

mod client;

use thiserror::Error;

use crate::model::{ProjectId, ProjectSeed, RemoteHead};

pub use client::GitLabClient;

/// Why a group could not be listed. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("GitLab rejected the access token (HTTP {0})")]
    Unauthorized(u16),

    #[error("GitLab request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolves a group name to its projects.
pub trait ProjectLister {
    fn list_projects(&self, group: &str) -> Result<Vec<ProjectSeed>, ListingError>;
}

/// Looks up the newest commit of a ref on the remote.
pub trait RemoteMetadata: Send + Sync {
    /// Returns [`RemoteHead::Commit`] or [`RemoteHead::NoCommits`]; a failed
    /// lookup is an `Err`, which callers turn into [`RemoteHead::Unavailable`].
    fn latest_commit(&self, project: ProjectId, ref_name: &str) -> anyhow::Result<RemoteHead>;
}
