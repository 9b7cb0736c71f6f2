//! Repository listing and cleanup on top of the walker

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::filter::PathFilter;
use crate::git::{is_git_dir, is_repository};
use crate::node::DiskNode;
use crate::walk::{Scan, Sweep, WalkOutcome, WalkerConfig, scan, sweep};

/// Where and how to look for repositories.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub root: PathBuf,
    pub extra_roots: Vec<PathBuf>,
    pub follow_links: bool,
    pub walker: WalkerConfig,
}

impl SearchConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    fn nodes(&self) -> (DiskNode, Vec<DiskNode>) {
        let node = |p: &Path| DiskNode::new(p).follow_links(self.follow_links);
        (
            node(&self.root),
            self.extra_roots.iter().map(|p| node(p)).collect(),
        )
    }
}

/// Find every repository below the roots whose relative path passes `filter`.
/// Repositories nested inside other repositories are not reported.
pub fn find_repositories(config: &SearchConfig, filter: PathFilter) -> WalkOutcome {
    let (root, extra) = config.nodes();
    let matcher = Scan::matching(move |path, root, _depth| {
        if is_git_dir(path) {
            return (false, false);
        }
        if is_repository(path) {
            return (filter.matches(path, root), false);
        }
        (false, true)
    });
    let outcome = scan(root, extra, config.walker.clone(), matcher);
    debug!(found = outcome.marks.len(), "repository scan done");
    outcome
}

/// Find directories below the roots that hold nothing but other empty
/// directories, innermost first. Repositories never count as empty, and the
/// roots themselves are never reported.
pub fn find_empty_dirs(config: &SearchConfig) -> WalkOutcome {
    let (root, extra) = config.nodes();
    let stop = Sweep::with_stop(|path, _root, _depth| is_git_dir(path) || is_repository(path));
    let mut outcome = sweep(root, extra, config.walker.clone(), stop);
    // a root is the only node at depth 0
    outcome.marks.retain(|m| m.score > 0);
    debug!(found = outcome.marks.len(), "empty directory sweep done");
    outcome
}

/// Remove the given directories in order. Stops at the first failure.
pub fn remove_dirs<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> io::Result<usize> {
    let mut removed = 0;
    for dir in dirs {
        fs::remove_dir(dir)?;
        info!(path = %dir.display(), "removed empty directory");
        removed += 1;
    }
    Ok(removed)
}
