use anyhow::{Context, Result};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::error;

use super::executor::{ExecError, Executor, Terminal};
use super::outcome::OperationOutcome;
use super::report::Reporter;
use crate::model::RepositoryDescriptor;

/// Final state of every repository in a run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub results: Vec<(String, Terminal)>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub cloned: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl RunSummary {
    pub fn counts(&self) -> Counts {
        let mut c = Counts::default();
        for (_, t) in &self.results {
            match t {
                Terminal::Cloned => c.cloned += 1,
                Terminal::Updated => c.updated += 1,
                Terminal::UpToDate => c.up_to_date += 1,
                Terminal::Skipped => c.skipped += 1,
                Terminal::Failed(_) => c.failed += 1,
                Terminal::Cancelled => c.cancelled += 1,
            }
        }
        c
    }

    pub fn has_failures(&self) -> bool {
        self.counts().failed > 0
    }
}

/// Runs one [`Executor`] per repository on a pool of exactly
/// `max_concurrent` workers, so at most that many repositories are being
/// touched at once.
///
/// A repository failure never stops the others. A launch failure
/// ([`ExecError`]) means the environment is broken: repositories that have
/// not started yet end as [`Terminal::Cancelled`] and the error is returned
/// once the in-flight ones are done.
pub struct Coordinator {
    max_concurrent: usize,
}

impl Coordinator {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn run(
        &self,
        repos: &[RepositoryDescriptor],
        executor: &Executor<'_>,
        reporter: &dyn Reporter,
    ) -> Result<RunSummary> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.max_concurrent)
            .thread_name(|idx| format!("glsync-sync-{idx}"))
            .build()
            .context("failed to initialize sync worker pool")?;

        let aborted = AtomicBool::new(false);
        let fatal: Mutex<Option<ExecError>> = Mutex::new(None);

        let results: Vec<(String, Terminal)> = pool.install(|| {
            repos
                .par_iter()
                .map(|repo| {
                    let terminal = if aborted.load(Ordering::SeqCst) {
                        Terminal::Cancelled
                    } else {
                        match executor.execute(repo, reporter) {
                            Ok(t) => t,
                            Err(e) => {
                                error!(repository = %repo.name, "{e}");
                                aborted.store(true, Ordering::SeqCst);
                                let op = e.operation();
                                reporter.report(OperationOutcome::failure(
                                    &repo.name,
                                    op,
                                    e.to_string(),
                                ));
                                if let Ok(mut slot) = fatal.lock()
                                    && slot.is_none()
                                {
                                    *slot = Some(e);
                                }
                                Terminal::Failed(op)
                            }
                        }
                    };
                    reporter.finished(&repo.name, terminal);
                    (repo.name.clone(), terminal)
                })
                .collect()
        });

        let fatal = fatal.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(e) = fatal {
            return Err(e).context("aborting: local environment cannot run git");
        }
        Ok(RunSummary { results })
    }
}
