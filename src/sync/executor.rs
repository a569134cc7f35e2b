use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::decision::{LocalState, SyncDecision, decide};
use super::outcome::{Operation, OperationOutcome};
use super::report::Reporter;
use crate::git::{HeadProber, Invocation, ProcessRunner, commands};
use crate::model::{RemoteHead, RepositoryDescriptor};

/// How one repository's run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "operation")]
pub enum Terminal {
    Cloned,
    Updated,
    UpToDate,
    Skipped,
    Failed(Operation),
    /// Never started because the run was aborted.
    Cancelled,
}

/// A broken local environment; aborts the whole run.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        operation: Operation,
        command: String,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    pub fn operation(&self) -> Operation {
        match self {
            ExecError::Launch { operation, .. } => *operation,
        }
    }
}

#[derive(Debug)]
enum State {
    Start(SyncDecision),
    Cloning,
    Probing,
    Fetching,
    Merging,
    Done(Terminal),
    Failed(Operation),
}

/// Drives one repository from its [`SyncDecision`] to a [`Terminal`] state.
///
/// Steps run strictly in sequence: merge only ever follows a successful
/// fetch, and nothing after a clone. Every executed step is reported.
pub struct Executor<'a> {
    runner: &'a dyn ProcessRunner,
    prober: &'a dyn HeadProber,
    root: &'a Path,
    ref_name: &'a str,
}

impl<'a> Executor<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        prober: &'a dyn HeadProber,
        root: &'a Path,
        ref_name: &'a str,
    ) -> Self {
        Self {
            runner,
            prober,
            root,
            ref_name,
        }
    }

    pub fn local_state(&self, path: &Path) -> LocalState {
        if !path.is_dir() {
            return LocalState::Absent;
        }
        match self.prober.local_head(path) {
            Ok(h) => LocalState::Head(h),
            Err(e) => LocalState::Unreadable(format!("{e:#}")),
        }
    }

    /// Run the state machine for `repo`, streaming outcomes to `reporter`.
    ///
    /// # Errors
    /// Only when a command cannot be launched at all. Non-zero exits end in
    /// [`Terminal::Failed`] instead.
    pub fn execute(
        &self,
        repo: &RepositoryDescriptor,
        reporter: &dyn Reporter,
    ) -> Result<Terminal, ExecError> {
        let path = repo.local_path(self.root);
        let decision = decide(&repo.remote_head, &self.local_state(&path));
        debug!(repository = %repo.name, ?decision, "decided");

        let name = repo.name.as_str();
        let mut state = State::Start(decision);
        loop {
            state = match state {
                State::Start(SyncDecision::Clone) => match fs::create_dir_all(self.root) {
                    Ok(()) => State::Cloning,
                    Err(e) => {
                        reporter.report(OperationOutcome::failure(
                            name,
                            Operation::Clone,
                            format!("cannot create {}: {e}", self.root.display()),
                        ));
                        State::Failed(Operation::Clone)
                    }
                },
                State::Start(SyncDecision::Skip) => State::Done(Terminal::Skipped),
                State::Start(SyncDecision::UpToDate) => State::Done(Terminal::UpToDate),
                State::Start(SyncDecision::Update) => State::Probing,
                State::Start(SyncDecision::ProbeFailed(reason)) => {
                    reporter.report(OperationOutcome::failure(
                        name,
                        Operation::Probe,
                        format!("local head undeterminable: {reason}"),
                    ));
                    State::Failed(Operation::Probe)
                }
                State::Start(SyncDecision::RemoteUnavailable(reason)) => {
                    reporter.report(OperationOutcome::failure(name, Operation::Remote, reason));
                    State::Done(Terminal::Skipped)
                }
                State::Cloning => {
                    let inv = commands::clone(&repo.clone_url, &path, self.root);
                    self.step(name, Operation::Clone, &inv, reporter, |ok| {
                        if ok {
                            State::Done(Terminal::Cloned)
                        } else {
                            State::Failed(Operation::Clone)
                        }
                    })?
                }
                State::Probing => match self.prober.local_head(&path) {
                    Ok(h) if repo.remote_head == RemoteHead::Commit(h.clone()) => {
                        State::Done(Terminal::UpToDate)
                    }
                    Ok(_) => State::Fetching,
                    Err(e) => {
                        reporter.report(OperationOutcome::failure(
                            name,
                            Operation::Probe,
                            format!("local head undeterminable: {e:#}"),
                        ));
                        State::Failed(Operation::Probe)
                    }
                },
                State::Fetching => {
                    let inv = commands::fetch(&path);
                    self.step(name, Operation::Fetch, &inv, reporter, |ok| {
                        if ok {
                            State::Merging
                        } else {
                            State::Failed(Operation::Fetch)
                        }
                    })?
                }
                State::Merging => {
                    let inv = commands::merge(&path, self.ref_name);
                    self.step(name, Operation::Merge, &inv, reporter, |ok| {
                        if ok {
                            State::Done(Terminal::Updated)
                        } else {
                            State::Failed(Operation::Merge)
                        }
                    })?
                }
                State::Done(t) => return Ok(t),
                State::Failed(op) => return Ok(Terminal::Failed(op)),
            };
        }
    }

    /// Run one command, report its outcome and pick the next state.
    fn step(
        &self,
        name: &str,
        operation: Operation,
        inv: &Invocation,
        reporter: &dyn Reporter,
        next: impl FnOnce(bool) -> State,
    ) -> Result<State, ExecError> {
        debug!(repository = name, command = %inv.display(), "running");
        let out = self.runner.run(inv).map_err(|source| ExecError::Launch {
            operation,
            command: inv.display(),
            source,
        })?;
        let ok = out.success();
        reporter.report(OperationOutcome::from_process(name, operation, out));
        Ok(next(ok))
    }
}
