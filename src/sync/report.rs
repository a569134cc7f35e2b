use colored::Colorize;
use indicatif::ProgressBar;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::coordinator::RunSummary;
use super::executor::Terminal;
use super::outcome::{Operation, OperationOutcome, Status};
use super::progress::{bar_style, err_style, ok_style};

/// Sink for everything the engine produces. Purely observational: nothing
/// a reporter does feeds back into the sync.
pub trait Reporter: Send + Sync {
    fn report(&self, outcome: OperationOutcome);

    fn finished(&self, _repository: &str, _terminal: Terminal) {}

    fn summary(&self, _summary: &RunSummary) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Failure,
}

/// Human-readable line for an outcome, or `None` for steps that are only
/// interesting when they fail.
pub fn message(o: &OperationOutcome) -> Option<(Tone, String)> {
    let name = &o.repository;
    match (o.operation, o.status) {
        (Operation::Clone, Status::Success) => Some((Tone::Success, format!("{name} was cloned"))),
        (Operation::Merge, Status::Success) => {
            Some((Tone::Success, format!("{name} was updated")))
        }
        (Operation::Fetch | Operation::Probe | Operation::Remote, Status::Success) => None,
        (Operation::Clone, Status::Failure) => {
            Some((Tone::Failure, format!("Failed to clone {name}")))
        }
        (Operation::Fetch, Status::Failure) => {
            Some((Tone::Failure, format!("Failed to fetch {name}")))
        }
        (Operation::Merge, Status::Failure) => {
            Some((Tone::Failure, format!("Failed to merge {name}")))
        }
        (Operation::Probe, Status::Failure) => Some((
            Tone::Failure,
            format!("Couldn't check last local commit in project {name}"),
        )),
        (Operation::Remote, Status::Failure) => Some((
            Tone::Warning,
            format!("Couldn't get latest remote commit for {name}, skipping"),
        )),
    }
}

/// Terminal output: one progress bar over all repositories, with
/// messages printed above it. Failures are red and carry the command output.
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(bar_style());
        bar.set_message("syncing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, outcome: OperationOutcome) {
        let Some((tone, text)) = message(&outcome) else {
            debug!(repository = %outcome.repository, operation = %outcome.operation, "ok");
            return;
        };
        let output = outcome.output.trim_end();
        self.bar.suspend(|| match tone {
            Tone::Success => println!("{}", text),
            Tone::Warning => {
                println!("{}", text.yellow());
                if !output.is_empty() {
                    println!("{}", output.yellow());
                }
            }
            Tone::Failure => {
                println!("{}", text.red());
                if !output.is_empty() {
                    println!("{}", output.red());
                }
            }
        });
    }

    fn finished(&self, repository: &str, _terminal: Terminal) {
        self.bar.inc(1);
        self.bar.set_message(repository.to_string());
    }

    fn summary(&self, summary: &RunSummary) {
        let c = summary.counts();
        self.bar
            .set_style(if c.failed > 0 { err_style() } else { ok_style() });
        self.bar.finish_with_message(format!(
            "cloned {}, updated {}, up to date {}, skipped {}, failed {}, cancelled {}",
            c.cloned, c.updated, c.up_to_date, c.skipped, c.failed, c.cancelled
        ));
    }
}

/// One JSON object per line on stdout, for log shippers and scripts.
#[derive(Debug, Default)]
pub struct JsonReporter;

#[derive(Serialize)]
struct FinishedLine<'a> {
    repository: &'a str,
    #[serde(flatten)]
    terminal: Terminal,
}

impl JsonReporter {
    fn emit<T: Serialize>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("cannot serialize report line: {e}"),
        }
    }
}

impl Reporter for JsonReporter {
    fn report(&self, outcome: OperationOutcome) {
        self.emit(&outcome);
    }

    fn finished(&self, repository: &str, terminal: Terminal) {
        self.emit(&FinishedLine {
            repository,
            terminal,
        });
    }

    fn summary(&self, summary: &RunSummary) {
        self.emit(&serde_json::json!({ "summary": summary.counts() }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(op: Operation, status: Status) -> OperationOutcome {
        OperationOutcome {
            repository: "svc-a".into(),
            operation: op,
            status,
            exit_code: Some(if status == Status::Success { 0 } else { 1 }),
            output: String::new(),
        }
    }

    #[test]
    fn successes_with_messages() {
        assert_eq!(
            message(&outcome(Operation::Clone, Status::Success)),
            Some((Tone::Success, "svc-a was cloned".to_string()))
        );
        assert_eq!(
            message(&outcome(Operation::Merge, Status::Success)),
            Some((Tone::Success, "svc-a was updated".to_string()))
        );
        assert_eq!(message(&outcome(Operation::Fetch, Status::Success)), None);
    }

    #[test]
    fn failures_are_marked_distinctly() {
        for (op, want) in [
            (Operation::Clone, "Failed to clone svc-a"),
            (Operation::Fetch, "Failed to fetch svc-a"),
            (Operation::Merge, "Failed to merge svc-a"),
            (
                Operation::Probe,
                "Couldn't check last local commit in project svc-a",
            ),
        ] {
            assert_eq!(
                message(&outcome(op, Status::Failure)),
                Some((Tone::Failure, want.to_string()))
            );
        }
    }

    #[test]
    fn remote_failure_is_a_warning() {
        let (tone, _) = message(&outcome(Operation::Remote, Status::Failure)).unwrap();
        assert_eq!(tone, Tone::Warning);
    }

    #[test]
    fn json_lines_use_lowercase_tags() {
        let o = outcome(Operation::Merge, Status::Failure);
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["operation"], "merge");
        assert_eq!(v["status"], "failure");
        assert_eq!(v["exit_code"], 1);

        let line = FinishedLine {
            repository: "svc-a",
            terminal: Terminal::Failed(Operation::Merge),
        };
        let v = serde_json::to_value(&line).unwrap();
        assert_eq!(v["state"], "failed");
        assert_eq!(v["operation"], "merge");
    }
}
