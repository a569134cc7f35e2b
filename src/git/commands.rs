use std::path::Path;

use super::process::Invocation;

const GIT: &str = "git";

fn git(args: &[&str], cwd: Option<&Path>) -> Invocation {
    Invocation {
        program: GIT.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
        cwd: cwd.map(Path::to_path_buf),
    }
}

/// `git clone <url> <dest>`, run from the mirror root.
pub fn clone(url: &str, dest: &Path, parent: &Path) -> Invocation {
    let dest = dest.to_string_lossy();
    git(&["clone", url, &dest], Some(parent))
}

/// `git fetch origin` inside the working copy.
pub fn fetch(repo_dir: &Path) -> Invocation {
    git(&["fetch", "origin"], Some(repo_dir))
}

/// `git merge --ff-only origin/<ref>` inside the working copy.
///
/// Diverged histories make this exit non-zero; nothing is reconciled.
pub fn merge(repo_dir: &Path, ref_name: &str) -> Invocation {
    let upstream = format!("origin/{}", ref_name);
    git(&["merge", "--ff-only", &upstream], Some(repo_dir))
}
