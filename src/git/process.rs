use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use std::io::{self, Read};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        let mut s = self.program.clone();
        for a in &self.args {
            s.push(' ');
            s.push_str(a);
        }
        s
    }
}

/// Result of a command that was launched.
///
/// `exit_code` is `None` when the process was terminated by a signal,
/// which includes being killed at the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub output: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands.
///
/// A non-zero exit is returned as data. `Err` means the command could not be
/// launched at all.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, inv: &Invocation) -> io::Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process`, with an optional deadline.
///
/// Each child gets its own process group so that helpers it spawns
/// (e.g. `ssh` under `git fetch`) are killed together with it. stdout and
/// stderr share one pipe, so the output keeps the order the child wrote it in.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, inv: &Invocation) -> io::Result<ProcessOutput> {
        let (mut reader, writer) = io::pipe()?;
        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer)
            .process_group(0);
        if let Some(dir) = &inv.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;
        // The command still holds the write ends; EOF needs them closed.
        drop(cmd);
        let pgid = Pid::from_raw(child.id() as i32);

        let (done_tx, done_rx) = mpsc::channel::<()>();
        let timed_out = Arc::new(AtomicBool::new(false));
        let watchdog = self.timeout.map(|limit| {
            let flag = Arc::clone(&timed_out);
            thread::spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(limit) {
                    flag.store(true, Ordering::SeqCst);
                    let _ = killpg(pgid, Signal::SIGKILL);
                }
            })
        });

        let mut raw = Vec::new();
        let read = reader.read_to_end(&mut raw);
        let waited = child.wait();
        drop(done_tx);
        if let Some(h) = watchdog {
            let _ = h.join();
        }
        read?;
        let status = waited?;

        let mut output = String::from_utf8_lossy(&raw).into_owned();
        let timed_out = timed_out.load(Ordering::SeqCst);
        if timed_out && let Some(limit) = self.timeout {
            output.push_str(&format!("\ntimed out after {}s", limit.as_secs_f32()));
        }

        Ok(ProcessOutput {
            exit_code: status.code(),
            output,
            timed_out,
        })
    }
}
