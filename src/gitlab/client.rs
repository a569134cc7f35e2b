use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ListingError, ProjectLister, RemoteMetadata};
use crate::config::{CloneProtocol, Config};
use crate::model::{CommitId, ProjectId, ProjectSeed, RemoteHead};

const PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct Group {
    id: u64,
    path: String,
    #[serde(default)]
    full_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Project {
    id: u64,
    path: String,
    ssh_url_to_repo: String,
    http_url_to_repo: String,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    id: String,
}

/// Blocking GitLab REST client, shared by all worker threads.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    api: String,
    protocol: CloneProtocol,
}

impl GitLabClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("glsync/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(tok) = &cfg.token {
            let mut v = HeaderValue::from_str(tok).context("access token is not a valid header")?;
            v.set_sensitive(true);
            headers.insert("PRIVATE-TOKEN", v);
        }
        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api: cfg.api_base(),
            protocol: cfg.clone_protocol,
        })
    }

    fn find_group(&self, group: &str) -> Result<u64, ListingError> {
        let resp = self
            .http
            .get(format!("{}/groups", self.api))
            .query(&[("search", group), ("per_page", PER_PAGE)])
            .send()?;
        let groups: Vec<Group> = check(resp)?.json()?;
        groups
            .into_iter()
            .find(|g| g.path == group || g.full_path.as_deref() == Some(group))
            .map(|g| g.id)
            .ok_or_else(|| ListingError::GroupNotFound(group.to_string()))
    }
}

/// Map auth failures to [`ListingError::Unauthorized`] and any other
/// non-success status to [`ListingError::Http`].
fn check(resp: Response) -> Result<Response, ListingError> {
    match resp.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ListingError::Unauthorized(resp.status().as_u16()))
        }
        _ => Ok(resp.error_for_status()?),
    }
}

fn next_page(resp: &Response) -> Option<String> {
    resp.headers()
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ProjectLister for GitLabClient {
    fn list_projects(&self, group: &str) -> Result<Vec<ProjectSeed>, ListingError> {
        let group_id = self.find_group(group)?;
        debug!(group, group_id, "resolved group");

        let mut seeds = Vec::new();
        let mut page = "1".to_string();
        loop {
            let resp = self
                .http
                .get(format!("{}/groups/{}/projects", self.api, group_id))
                .query(&[("per_page", PER_PAGE), ("page", page.as_str())])
                .send()?;
            let resp = check(resp)?;
            let next = next_page(&resp);
            let projects: Vec<Project> = resp.json()?;

            seeds.extend(projects.into_iter().map(|p| ProjectSeed {
                id: ProjectId(p.id),
                name: p.path,
                clone_url: match self.protocol {
                    CloneProtocol::Ssh => p.ssh_url_to_repo,
                    CloneProtocol::Http => p.http_url_to_repo,
                },
            }));

            match next {
                Some(n) => page = n,
                None => break,
            }
        }
        Ok(seeds)
    }
}

impl RemoteMetadata for GitLabClient {
    fn latest_commit(&self, project: ProjectId, ref_name: &str) -> Result<RemoteHead> {
        let commits: Vec<CommitRef> = self
            .http
            .get(format!("{}/projects/{}/repository/commits", self.api, project))
            .query(&[("ref_name", ref_name), ("page", "0"), ("per_page", "1")])
            .send()?
            .error_for_status()?
            .json()?;

        match commits.first() {
            None => Ok(RemoteHead::NoCommits),
            Some(c) => CommitId::parse(&c.id)
                .map(RemoteHead::Commit)
                .ok_or_else(|| anyhow!("malformed commit id from API: {:?}", c.id)),
        }
    }
}
