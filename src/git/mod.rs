//! Git integration layer.
//!
//! Two seams live here, both behind traits so the sync engine can be
//! exercised without touching real repositories:
//!
//! - [`ProcessRunner`]: runs the `git` CLI for clone/fetch/merge, which
//!   need the user's credentials and hooks exactly as a shell would.
//! - [`HeadProber`]: reads the local head commit in-process via `git2`.
//!
//! The command lines themselves are built by [`commands`].

pub mod commands;
mod git2_backend;
mod process;

pub use git2_backend::{Git2Prober, HeadProber};
pub use process::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};
