mod coordinator;
mod decision;
mod executor;
mod jobs;
mod outcome;
mod progress;
mod report;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::git::{Git2Prober, HeadProber, ProcessRunner, SystemRunner};
use crate::gitlab::{GitLabClient, ProjectLister};

pub use coordinator::{Coordinator, Counts, RunSummary};
pub use decision::{LocalState, SyncDecision, decide};
pub use executor::{ExecError, Executor, Terminal};
pub use outcome::{Operation, OperationOutcome, Status};
pub use report::{ConsoleReporter, JsonReporter, Reporter};

use progress::{err_style, ok_style, spinner_style};

/// How results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Mirror every project of `group` into `dir`.
///
/// High-level flow:
/// 1. Create `dir` (fatal if impossible).
/// 2. Resolve the group to its projects (fatal if the group is unknown or
///    the token is rejected).
/// 3. Look up each project's remote head on the lookup pool
///    (see [`jobs::build_jobs`]).
/// 4. Clone or fetch+merge each project on a pool of `cfg.jobs` workers
///    (see [`Coordinator`]).
///
/// Failures of individual repositories are reported and counted in the
/// returned [`RunSummary`]; they are not errors of this function.
pub fn cmd_sync(cfg: &Config, group: &str, dir: &Path, format: OutputFormat) -> Result<RunSummary> {
    let runner = SystemRunner::new(cfg.command_timeout);
    sync_group(cfg, group, dir, format, &runner, &Git2Prober)
}

/// [`cmd_sync`] with the git backends supplied by the caller.
fn sync_group(
    cfg: &Config,
    group: &str,
    dir: &Path,
    format: OutputFormat,
    runner: &dyn ProcessRunner,
    prober: &dyn HeadProber,
) -> Result<RunSummary> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let spinner = match format {
        OutputFormat::Text => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(spinner_style());
            pb.enable_steady_tick(Duration::from_millis(80));
            pb.set_message(format!("resolving group {group}…"));
            Some(pb)
        }
        OutputFormat::Json => None,
    };

    let client = GitLabClient::new(cfg)?;
    let seeds = match client.list_projects(group) {
        Ok(seeds) => seeds,
        Err(e) => {
            if let Some(pb) = &spinner {
                pb.set_style(err_style());
                pb.finish_with_message(format!("resolving group {group} (error: {e})"));
            }
            return Err(e).with_context(|| format!("cannot list projects of group `{group}`"));
        }
    };
    info!(group, projects = seeds.len(), "group resolved");

    if seeds.is_empty() {
        if let Some(pb) = &spinner {
            pb.set_style(ok_style());
            pb.finish_with_message(format!("no projects in group {group}"));
        }
        return Ok(RunSummary::default());
    }

    if let Some(pb) = &spinner {
        pb.set_message(format!("checking {} remote heads…", seeds.len()));
    }
    let repos = jobs::build_jobs(seeds, &client, &cfg.ref_name, cfg.probe_jobs)?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let executor = Executor::new(runner, prober, dir, &cfg.ref_name);
    let reporter: Box<dyn Reporter> = match format {
        OutputFormat::Text => Box::new(ConsoleReporter::new(repos.len() as u64)),
        OutputFormat::Json => Box::new(JsonReporter),
    };

    let summary = Coordinator::new(cfg.jobs).run(&repos, &executor, reporter.as_ref())?;
    reporter.summary(&summary);
    Ok(summary)
}
