use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;

use crate::model::CommitId;

/// Reads the commit a local working copy currently points at.
pub trait HeadProber: Send + Sync {
    /// Full id of the commit `HEAD` resolves to.
    ///
    /// # Errors
    /// Returns an error if `path` is not a repository, `HEAD` is unborn,
    /// or it does not peel to a commit.
    fn local_head(&self, path: &Path) -> Result<CommitId>;
}

/// [`HeadProber`] that opens the repository with `git2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Prober;

impl HeadProber for Git2Prober {
    fn local_head(&self, path: &Path) -> Result<CommitId> {
        let repo = Repository::open(path)
            .with_context(|| format!("not a git repository: {}", path.display()))?;
        let head = repo.head().context("HEAD cannot be resolved")?;
        let commit = head
            .peel_to_commit()
            .context("HEAD does not point to a commit")?;
        Ok(CommitId::new(commit.id().to_string()))
    }
}
