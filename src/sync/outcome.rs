use serde::Serialize;
use std::fmt;

use crate::git::ProcessOutput;

/// A step the executor can attempt for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Clone,
    Fetch,
    Merge,
    /// Reading the local head commit.
    Probe,
    /// Looking up the remote head commit.
    Remote,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Clone => "clone",
            Operation::Fetch => "fetch",
            Operation::Merge => "merge",
            Operation::Probe => "probe",
            Operation::Remote => "remote",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

/// Result of one executed step. Handed to the reporter exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub repository: String,
    pub operation: Operation,
    pub status: Status,
    /// Process exit code; `None` for in-process steps or killed processes.
    pub exit_code: Option<i32>,
    pub output: String,
}

impl OperationOutcome {
    pub fn from_process(repository: &str, operation: Operation, out: ProcessOutput) -> Self {
        Self {
            repository: repository.to_string(),
            operation,
            status: if out.success() {
                Status::Success
            } else {
                Status::Failure
            },
            exit_code: out.exit_code,
            output: out.output,
        }
    }

    /// A failure that did not come from a process exit.
    pub fn failure(repository: &str, operation: Operation, reason: impl Into<String>) -> Self {
        Self {
            repository: repository.to_string(),
            operation,
            status: Status::Failure,
            exit_code: None,
            output: reason.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == Status::Success
    }
}
