//! Crate entry point for **glsync**.
//!
//! This library provides the implementation behind the `glsync` CLI, which
//! mirrors every repository of a GitLab group into a local directory.
//! Each submodule encapsulates one responsibility (config, GitLab API,
//! git operations, the sync engine).
//!
//! This file is primarily intended for developers hacking on `glsync`.

mod config;
mod git;
mod gitlab;
mod model;
mod paths;
mod sync;

/// Re-export the types the CLI and embedders need from `glsync::*`.
pub use config::{CloneProtocol, Config, Overrides, load_config};
pub use git::{Git2Prober, HeadProber, Invocation, ProcessOutput, ProcessRunner, SystemRunner};
pub use gitlab::{GitLabClient, ListingError, ProjectLister, RemoteMetadata};
pub use model::{CommitId, ProjectId, ProjectSeed, RemoteHead, RepositoryDescriptor};
pub use paths::{default_config_path, glsync_home};
pub use sync::{
    ConsoleReporter, Coordinator, Counts, ExecError, Executor, JsonReporter, LocalState,
    Operation, OperationOutcome, OutputFormat, Reporter, RunSummary, Status, SyncDecision,
    Terminal, cmd_sync, decide,
};
