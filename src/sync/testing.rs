//! In-memory stand-ins for the process runner, the head prober and the
//! reporter, shared by the engine's unit tests.

use anyhow::{Result, anyhow};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::executor::Terminal;
use super::outcome::OperationOutcome;
use super::report::Reporter;
use crate::git::{HeadProber, Invocation, ProcessOutput, ProcessRunner};
use crate::model::CommitId;

/// Records every invocation and answers with scripted exit codes.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    exits: Vec<(String, i32, String)>,
    unlaunchable: bool,
    delay: Option<Duration>,
    create_on_clone: bool,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeRunner {
    /// Any invocation whose rendered command contains `needle` exits with `code`.
    pub fn exit_with(mut self, needle: &str, code: i32, output: &str) -> Self {
        self.exits.push((needle.into(), code, output.into()));
        self
    }

    pub fn unlaunchable(mut self) -> Self {
        self.unlaunchable = true;
        self
    }

    pub fn delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Make `git clone` materialize its destination directory.
    pub fn create_on_clone(mut self) -> Self {
        self.create_on_clone = true;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, inv: &Invocation) -> io::Result<ProcessOutput> {
        if self.unlaunchable {
            return Err(io::Error::new(io::ErrorKind::NotFound, "git: not found"));
        }
        self.calls.lock().unwrap().push(inv.clone());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(d) = self.delay {
            thread::sleep(d);
        }
        let rendered = inv.display();
        let (code, output) = self
            .exits
            .iter()
            .find(|(needle, _, _)| rendered.contains(needle.as_str()))
            .map(|(_, c, o)| (*c, o.clone()))
            .unwrap_or((0, String::new()));
        if self.create_on_clone
            && code == 0
            && inv.args.first().map(String::as_str) == Some("clone")
        {
            fs::create_dir_all(&inv.args[2])?;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        Ok(ProcessOutput {
            exit_code: Some(code),
            output,
            timed_out: false,
        })
    }
}

/// Answers head lookups by directory name.
#[derive(Default)]
pub struct FakeProber {
    heads: HashMap<String, Mutex<VecDeque<String>>>,
    fallback: Option<String>,
}

impl FakeProber {
    pub fn with(self, name: &str, head: &str) -> Self {
        self.sequence(name, &[head])
    }

    /// Successive lookups return successive heads; the last one repeats.
    pub fn sequence(mut self, name: &str, heads: &[&str]) -> Self {
        let q = heads.iter().map(|s| s.to_string()).collect();
        self.heads.insert(name.into(), Mutex::new(q));
        self
    }

    /// Head reported for any directory not registered explicitly.
    pub fn fallback(mut self, head: &str) -> Self {
        self.fallback = Some(head.into());
        self
    }
}

impl HeadProber for FakeProber {
    fn local_head(&self, path: &Path) -> Result<CommitId> {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(q) = self.heads.get(&name) {
            let mut q = q.lock().unwrap();
            let head = if q.len() > 1 { q.pop_front() } else { q.front().cloned() };
            return head.map(CommitId::new).ok_or_else(|| anyhow!("no head"));
        }
        self.fallback
            .clone()
            .map(CommitId::new)
            .ok_or_else(|| anyhow!("not a git repository: {}", path.display()))
    }
}

/// Keeps everything it is handed.
#[derive(Default)]
pub struct Collector {
    outcomes: Mutex<Vec<OperationOutcome>>,
    finished: Mutex<Vec<(String, Terminal)>>,
}

impl Collector {
    pub fn outcomes(&self) -> Vec<OperationOutcome> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn terminals(&self) -> Vec<(String, Terminal)> {
        let mut v = self.finished.lock().unwrap().clone();
        v.sort_by(|a, b| a.0.cmp(&b.0));
        v
    }
}

impl Reporter for Collector {
    fn report(&self, outcome: OperationOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }

    fn finished(&self, repository: &str, terminal: Terminal) {
        self.finished
            .lock()
            .unwrap()
            .push((repository.to_string(), terminal));
    }
}
