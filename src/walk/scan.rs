//! Scan - enumerate every node matching a predicate

use std::fmt;
use std::path::Path;

use crate::error::HookError;
use crate::node::{Entry, FsNode};

use super::config::WalkerConfig;
use super::context::Context;
use super::strategy::{Schedule, Strategy};
use super::walker::{WalkOutcome, run};

/// Predicate deciding whether a node matches and whether to keep descending.
/// Called with the node's canonical path, the root's canonical path and the
/// node's depth; returns `(is_match, keep_descending)`.
pub type MatchFn = dyn Fn(&Path, &Path, usize) -> (bool, bool) + Send + Sync;

/// Marks every node the predicate matches, with a uniform score of 0, so
/// results come out in plain path order.
///
/// Children never feed anything back to their parent, so every one of them
/// is walked concurrently.
#[derive(Default)]
pub struct Scan {
    matcher: Option<Box<MatchFn>>,
}

impl Scan {
    /// Match every node and always descend.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching<F>(f: F) -> Self
    where
        F: Fn(&Path, &Path, usize) -> (bool, bool) + Send + Sync + 'static,
    {
        Self {
            matcher: Some(Box::new(f)),
        }
    }

    fn evaluate(&self, path: &Path, root: &Path, depth: usize) -> (bool, bool) {
        match &self.matcher {
            Some(f) => f(path, root, depth),
            None => (true, true),
        }
    }
}

impl fmt::Debug for Scan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scan")
            .field("matcher", &self.matcher.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Strategy for Scan {
    type Snapshot = ();

    fn enter_node<N: FsNode>(&self, ctx: &mut Context<'_, N, ()>) -> Result<bool, HookError> {
        let (is_match, descend) = self.evaluate(ctx.node_path(), ctx.root_path(), ctx.depth());
        if is_match {
            ctx.mark(0);
        }
        Ok(descend)
    }

    fn decide_child<N: FsNode>(
        &self,
        _entry: &Entry,
        valid: bool,
        _ctx: &mut Context<'_, N, ()>,
    ) -> Result<Schedule, HookError> {
        Ok(if valid {
            Schedule::Concurrent
        } else {
            Schedule::Skip
        })
    }
}

/// Scan `root` and `extra_roots` with `scan`.
pub fn scan<N: FsNode>(
    root: N,
    extra_roots: impl IntoIterator<Item = N>,
    config: WalkerConfig,
    scan: Scan,
) -> WalkOutcome {
    run(root, extra_roots, config, scan)
}
