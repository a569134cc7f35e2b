use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::paths::default_config_path;

pub const DEFAULT_JOBS: usize = 7;
pub const DEFAULT_REF: &str = "master";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Which of the project's clone addresses to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloneProtocol {
    #[default]
    Ssh,
    Http,
}

/// On-disk shape of `config.toml`. Every key is optional.
///
/// Example TOML:
/// ```toml
/// url   = "https://gitlab.example.com"
/// token = "glpat-..."
/// jobs  = 7
/// ref_name = "master"
/// clone_protocol = "ssh"
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    url: Option<String>,
    token: Option<String>,
    api_version: Option<String>,
    jobs: Option<usize>,
    probe_jobs: Option<usize>,
    ref_name: Option<String>,
    clone_protocol: Option<CloneProtocol>,
    command_timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run.
///
/// Built once in `main` and handed to the GitLab client and the sync engine.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub token: Option<String>,
    pub api_version: String,
    pub jobs: usize,
    pub probe_jobs: usize,
    pub ref_name: String,
    pub clone_protocol: CloneProtocol,
    pub command_timeout: Option<Duration>,
}

/// Values given on the command line; they take precedence over file and env.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub jobs: Option<usize>,
    pub ref_name: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn api_base(&self) -> String {
        format!("{}/api/{}", self.url.trim_end_matches('/'), self.api_version)
    }
}

/// Load configuration from `path` (or the default location), then apply
/// `GITLAB_URL` / `GITLAB_TOKEN` and the CLI overrides.
///
/// # Errors
/// - An explicitly given file that cannot be read.
/// - Invalid TOML.
/// - No base URL from any source, or a zero worker count.
pub fn load_config(path: Option<&Path>, ov: &Overrides) -> Result<Config> {
    let file = match path {
        Some(p) => {
            let txt = fs::read_to_string(p)
                .with_context(|| format!("config not found: {}", p.display()))?;
            parse_file(&txt, p)?
        }
        None => {
            let p = default_config_path()?;
            match fs::read_to_string(&p) {
                Ok(txt) => parse_file(&txt, &p)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to read {}", p.display()));
                }
            }
        }
    };
    resolve(file, ov)
}

fn parse_file(txt: &str, p: &Path) -> Result<FileConfig> {
    toml::from_str(txt).with_context(|| format!("failed to parse {}", p.display()))
}

fn resolve(file: FileConfig, ov: &Overrides) -> Result<Config> {
    let url = env::var("GITLAB_URL")
        .ok()
        .filter(|s| !s.is_empty())
        .or(file.url)
        .context("no GitLab URL configured (set `url` in config.toml or GITLAB_URL)")?;
    let token = env::var("GITLAB_TOKEN")
        .ok()
        .filter(|s| !s.is_empty())
        .or(file.token);

    let jobs = ov.jobs.or(file.jobs).unwrap_or(DEFAULT_JOBS);
    let probe_jobs = file.probe_jobs.unwrap_or_else(|| num_cpus::get() * 2);
    if jobs == 0 || probe_jobs == 0 {
        bail!("jobs and probe_jobs must be at least 1");
    }

    let timeout_secs = ov
        .timeout_secs
        .or(file.command_timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Config {
        url,
        token,
        api_version: file.api_version.unwrap_or_else(|| "v4".to_string()),
        jobs,
        probe_jobs,
        ref_name: ov
            .ref_name
            .clone()
            .or(file.ref_name)
            .unwrap_or_else(|| DEFAULT_REF.to_string()),
        clone_protocol: file.clone_protocol.unwrap_or_default(),
        command_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
    })
}
