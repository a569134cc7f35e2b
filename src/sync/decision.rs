use crate::model::{CommitId, RemoteHead};

/// What the prober found at a repository's target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalState {
    Absent,
    Head(CommitId),
    /// A directory exists but its head could not be read.
    Unreadable(String),
}

/// Per-repository plan, computed once before any side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDecision {
    Clone,
    /// The remote ref has no commits to compare against.
    Skip,
    UpToDate,
    Update,
    /// A local copy exists but its head is unknown; never overwritten.
    ProbeFailed(String),
    /// The remote head lookup failed; nothing is touched.
    RemoteUnavailable(String),
}

/// Combine the remote head and the local state into a [`SyncDecision`].
///
/// Order of checks:
/// 1. remote lookup failed → `RemoteUnavailable`
/// 2. no local copy → `Clone`
/// 3. remote has no commits → `Skip`
/// 4. local head unreadable → `ProbeFailed`
/// 5. identical full commit ids → `UpToDate`
/// 6. otherwise → `Update`
pub fn decide(remote: &RemoteHead, local: &LocalState) -> SyncDecision {
    match (remote, local) {
        (RemoteHead::Unavailable(reason), _) => SyncDecision::RemoteUnavailable(reason.clone()),
        (_, LocalState::Absent) => SyncDecision::Clone,
        (RemoteHead::NoCommits, _) => SyncDecision::Skip,
        (RemoteHead::Commit(_), LocalState::Unreadable(reason)) => {
            SyncDecision::ProbeFailed(reason.clone())
        }
        (RemoteHead::Commit(r), LocalState::Head(h)) if h == r => SyncDecision::UpToDate,
        (RemoteHead::Commit(_), LocalState::Head(_)) => SyncDecision::Update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(s: &str) -> RemoteHead {
        RemoteHead::Commit(CommitId::new(s))
    }

    fn head(s: &str) -> LocalState {
        LocalState::Head(CommitId::new(s))
    }

    #[test]
    fn absent_local_clones_when_remote_is_known() {
        for remote in [commit("abc123"), RemoteHead::NoCommits] {
            assert_eq!(decide(&remote, &LocalState::Absent), SyncDecision::Clone);
        }
    }

    #[test]
    fn no_commits_skips_for_any_present_local() {
        for local in [head("def456"), LocalState::Unreadable("bad".into())] {
            assert_eq!(decide(&RemoteHead::NoCommits, &local), SyncDecision::Skip);
        }
    }

    #[test]
    fn equal_heads_are_up_to_date() {
        assert_eq!(
            decide(&commit("def456"), &head("def456")),
            SyncDecision::UpToDate
        );
    }

    #[test]
    fn different_heads_need_update() {
        assert_eq!(
            decide(&commit("ghi789"), &head("def456")),
            SyncDecision::Update
        );
    }

    #[test]
    fn comparison_is_exact_not_prefix() {
        assert_eq!(
            decide(&commit("def456aa"), &head("def456")),
            SyncDecision::Update
        );
        assert_eq!(
            decide(&commit("DEF456"), &head("def456")),
            SyncDecision::Update
        );
    }

    #[test]
    fn unreadable_local_is_probe_failure() {
        assert_eq!(
            decide(&commit("abc"), &LocalState::Unreadable("no HEAD".into())),
            SyncDecision::ProbeFailed("no HEAD".into())
        );
    }

    #[test]
    fn failed_remote_lookup_wins_over_any_local_state() {
        for local in [
            LocalState::Absent,
            head("abc"),
            LocalState::Unreadable("bad".into()),
        ] {
            assert_eq!(
                decide(&RemoteHead::Unavailable("timeout".into()), &local),
                SyncDecision::RemoteUnavailable("timeout".into())
            );
        }
    }
}
