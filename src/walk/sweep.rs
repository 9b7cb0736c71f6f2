//! Sweep - find subtrees that are recursively empty
//!
//! A node counts as empty when nothing below it is anything but a directory:
//! it has no entries, or only entries that are themselves empty. Every empty
//! node is marked with its depth, so the innermost ones come first, which is
//! the order they can be removed in.

use std::fmt;
use std::path::Path;

use crate::error::HookError;
use crate::node::{Entry, FsNode};

use super::config::WalkerConfig;
use super::context::Context;
use super::strategy::{Schedule, Strategy};
use super::walker::{WalkOutcome, run};

/// Hook to stop at a node: called with the node's canonical path, the root's
/// canonical path and the node's depth. A node it stops at is not empty.
pub type StopFn = dyn Fn(&Path, &Path, usize) -> bool + Send + Sync;

#[derive(Default)]
pub struct Sweep {
    stop: Option<Box<StopFn>>,
}

impl Sweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop<F>(f: F) -> Self
    where
        F: Fn(&Path, &Path, usize) -> bool + Send + Sync + 'static,
    {
        Self { stop: Some(Box::new(f)) }
    }

    fn should_stop(&self, path: &Path, root: &Path, depth: usize) -> bool {
        self.stop.as_ref().is_some_and(|f| f(path, root, depth))
    }
}

impl fmt::Debug for Sweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sweep")
            .field("stop", &self.stop.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Strategy for Sweep {
    /// Whether the node is still empty as far as it has been looked at.
    type Snapshot = bool;

    fn enter_node<N: FsNode>(&self, ctx: &mut Context<'_, N, bool>) -> Result<bool, HookError> {
        if self.should_stop(ctx.node_path(), ctx.root_path(), ctx.depth()) {
            return Ok(false);
        }
        ctx.update_snapshot(|_| true);
        Ok(true)
    }

    fn decide_child<N: FsNode>(
        &self,
        _entry: &Entry,
        valid: bool,
        ctx: &mut Context<'_, N, bool>,
    ) -> Result<Schedule, HookError> {
        if !valid {
            ctx.update_snapshot(|_| false);
            return Ok(Schedule::Skip);
        }
        // Until the node is known to be non-empty, every child decides it.
        Ok(if *ctx.snapshot() {
            Schedule::Synchronous
        } else {
            Schedule::Concurrent
        })
    }

    fn after_child<N: FsNode>(
        &self,
        _entry: &Entry,
        child: bool,
        succeeded: bool,
        ctx: &mut Context<'_, N, bool>,
    ) -> Result<(), HookError> {
        ctx.update_snapshot(|empty| empty && succeeded && child);
        Ok(())
    }

    fn after_node<N: FsNode>(&self, ctx: &mut Context<'_, N, bool>) -> Result<(), HookError> {
        if *ctx.snapshot() {
            ctx.mark(i64::try_from(ctx.depth()).unwrap_or(i64::MAX));
        }
        Ok(())
    }
}

/// Sweep `root` and `extra_roots` with `sweep`.
pub fn sweep<N: FsNode>(
    root: N,
    extra_roots: impl IntoIterator<Item = N>,
    config: WalkerConfig,
    sweep: Sweep,
) -> WalkOutcome {
    run(root, extra_roots, config, sweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemTree;
    use crate::walk::Walker;

    fn tree() -> MemTree {
        MemTree::new()
            .dir("e/e1")
            .dir("e/e2")
            .dir("f/e")
            .file("f/f")
    }

    fn results(walker: &Walker<crate::test_utils::MemNode, Sweep>) -> Vec<String> {
        walker
            .results()
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    #[test]
    fn test_sweep_innermost_first() {
        let mut walker = Walker::new(tree().root(), Sweep::new());
        walker.walk().unwrap();
        assert_eq!(results(&walker), ["/e/e1", "/e/e2", "/f/e", "/e"]);
        assert_eq!(walker.scores(), [2, 2, 2, 1]);
    }

    #[test]
    fn test_sweep_empty_root() {
        let mut walker = Walker::new(MemTree::new().root(), Sweep::new());
        walker.walk().unwrap();
        assert_eq!(results(&walker), ["/"]);
        assert_eq!(walker.scores(), [0]);
    }

    #[test]
    fn test_sweep_stop_makes_ancestors_non_empty() {
        let tree = MemTree::new().dir("g/h");
        let sweep = Sweep::with_stop(|path, _root, _depth| path == Path::new("/g/h"));
        let mut walker = Walker::new(tree.root(), sweep);
        walker.walk().unwrap();
        assert!(results(&walker).is_empty());
    }

    #[test]
    fn test_sweep_stop_in_fixture() {
        let sweep = Sweep::with_stop(|path, _root, _depth| path == Path::new("/f/e"));
        let outcome = sweep_helper(sweep);
        let paths: Vec<_> = outcome.paths().map(|p| p.display().to_string()).collect();
        assert_eq!(paths, ["/e/e1", "/e/e2", "/e"]);
    }

    #[test]
    fn test_sweep_link_is_not_empty() {
        // Without following links a symlink is a plain entry, so "l" is not empty.
        let tree = MemTree::new().dir("l").dir("t").link("l/to-t", "t");
        let mut walker = Walker::new(tree.root(), Sweep::new());
        walker.walk().unwrap();
        assert_eq!(results(&walker), ["/t"]);
    }

    fn sweep_helper(s: Sweep) -> WalkOutcome {
        sweep(tree().root(), None, WalkerConfig::default(), s)
    }
}
