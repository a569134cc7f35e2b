//! # glsync
//!
//! **glsync** keeps a local mirror of every repository in a GitLab group.
//!
//! ```text
//! glsync <GROUP> <DIR>
//! ```
//!
//! - Projects missing under `DIR` are cloned.
//! - Existing working copies whose head differs from the remote are
//!   fetched and fast-forward merged.
//! - Everything else is left untouched.
//!
//! Connection settings come from `$(XDG_CONFIG_HOME)/glsync/config.toml`,
//! `GITLAB_URL` and `GITLAB_TOKEN`.
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;
use glsync::{OutputFormat, Overrides, cmd_sync, load_config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when the run could not proceed at all.
const EXIT_FATAL: u8 = 2;
/// Exit status under `--strict` when any repository failed.
const EXIT_REPO_FAILURES: u8 = 3;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "glsync",
    version,
    about = "glsync - mirror every repository of a GitLab group"
)]
struct Cli {
    /// Group path on the GitLab server
    group: String,

    /// Local directory holding the mirrors
    dir: PathBuf,

    /// Maximum repositories synchronized at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Branch compared and merged (default: master)
    #[arg(long = "ref", value_name = "REF")]
    ref_name: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/glsync/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-command deadline in seconds, 0 disables it
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exit non-zero when any repository failed
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse arguments; a usage error goes to stdout with exit status 1.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            println!("{}", e.render());
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let overrides = Overrides {
        jobs: cli.jobs,
        ref_name: cli.ref_name.clone(),
        timeout_secs: cli.timeout,
    };
    let cfg = load_config(cli.config.as_deref(), &overrides)?;
    let summary = cmd_sync(&cfg, &cli.group, &cli.dir, cli.format)?;

    if cli.strict && summary.has_failures() {
        return Ok(ExitCode::from(EXIT_REPO_FAILURES));
    }
    Ok(ExitCode::SUCCESS)
}

/// CLI entry point.
///
/// Repository failures are reported but leave the exit status at 0 unless
/// `--strict` is given; fatal errors always exit with [`EXIT_FATAL`].
fn main() -> ExitCode {
    let cli = parse_cli();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "fatal:".red().bold(), e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
