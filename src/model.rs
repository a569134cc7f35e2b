use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Numeric project id assigned by GitLab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full commit hash. Equality is byte-exact; abbreviated hashes never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accepts only full SHA-1 or SHA-256 hex ids.
    pub fn parse(s: &str) -> Option<Self> {
        let well_formed = matches!(s.len(), 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit());
        well_formed.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest commit of the tracked ref on the remote, as seen before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteHead {
    Commit(CommitId),
    /// The ref exists but has no commits yet.
    NoCommits,
    /// The lookup itself failed; carries the reason.
    Unavailable(String),
}

/// A project as returned by the group listing, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSeed {
    pub id: ProjectId,
    pub name: String,
    pub clone_url: String,
}

/// One remote repository to synchronize.
#[derive(Debug, Clone)]
pub struct RepositoryDescriptor {
    pub id: ProjectId,
    pub name: String,
    pub clone_url: String,
    pub remote_head: RemoteHead,
}

impl RepositoryDescriptor {
    pub fn from_seed(seed: ProjectSeed, remote_head: RemoteHead) -> Self {
        Self {
            id: seed.id,
            name: seed.name,
            clone_url: seed.clone_url,
            remote_head,
        }
    }

    /// Working copy location under the mirror root.
    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }
}
