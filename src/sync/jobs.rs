use anyhow::{Context, Result};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::warn;

use crate::gitlab::RemoteMetadata;
use crate::model::{ProjectSeed, RemoteHead, RepositoryDescriptor};

/// Build synchronization jobs by looking up each project's remote head.
///
/// Lookups are read-only, so they run on their own pool of `parallelism`
/// workers, independent of the gated sync phase. A failed lookup does not
/// drop the project: its head becomes [`RemoteHead::Unavailable`] and the
/// executor skips it with a warning.
///
/// The returned descriptors keep the order of `seeds`.
pub fn build_jobs(
    seeds: Vec<ProjectSeed>,
    remote: &dyn RemoteMetadata,
    ref_name: &str,
    parallelism: usize,
) -> Result<Vec<RepositoryDescriptor>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(parallelism.max(1))
        .thread_name(|idx| format!("glsync-probe-{idx}"))
        .build()
        .context("failed to initialize remote lookup pool")?;

    Ok(pool.install(|| {
        seeds
            .into_par_iter()
            .map(|seed| {
                let head = match remote.latest_commit(seed.id, ref_name) {
                    Ok(h) => h,
                    Err(e) => {
                        warn!(project = %seed.name, "remote head lookup failed: {e:#}");
                        RemoteHead::Unavailable(format!("{e:#}"))
                    }
                };
                RepositoryDescriptor::from_seed(seed, head)
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommitId, ProjectId};
    use anyhow::bail;
    use std::sync::Mutex;

    struct FakeRemote {
        seen_refs: Mutex<Vec<String>>,
    }

    impl RemoteMetadata for FakeRemote {
        fn latest_commit(&self, project: ProjectId, ref_name: &str) -> Result<RemoteHead> {
            self.seen_refs.lock().unwrap().push(ref_name.to_string());
            match project.0 {
                1 => Ok(RemoteHead::Commit(CommitId::new("abc123"))),
                2 => Ok(RemoteHead::NoCommits),
                _ => bail!("connection refused"),
            }
        }
    }

    fn seed(id: u64, name: &str) -> ProjectSeed {
        ProjectSeed {
            id: ProjectId(id),
            name: name.into(),
            clone_url: format!("git@gl:grp/{name}.git"),
        }
    }

    #[test]
    fn enriches_each_seed_and_keeps_order() {
        let remote = FakeRemote {
            seen_refs: Mutex::new(Vec::new()),
        };
        let seeds = vec![seed(1, "svc-a"), seed(2, "svc-b"), seed(3, "svc-c")];

        let jobs = build_jobs(seeds, &remote, "main", 4).unwrap();

        let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["svc-a", "svc-b", "svc-c"]);
        assert_eq!(
            jobs[0].remote_head,
            RemoteHead::Commit(CommitId::new("abc123"))
        );
        assert_eq!(jobs[1].remote_head, RemoteHead::NoCommits);
        assert!(
            matches!(&jobs[2].remote_head, RemoteHead::Unavailable(r) if r.contains("connection refused"))
        );
        assert!(remote.seen_refs.lock().unwrap().iter().all(|r| r == "main"));
    }
}
