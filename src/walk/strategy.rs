//! The policy interface the walker delegates every domain decision to

use crate::error::HookError;
use crate::node::{Entry, FsNode};

use super::context::Context;

/// How the walker should treat one listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Nothing more to do for this entry.
    Skip,
    /// Recurse inline and hand the child's snapshot back through
    /// [`Strategy::after_child`] before moving on to the next entry.
    Synchronous,
    /// Walk the child as an independent unit. The parent neither waits for
    /// it nor hears back from it; the child only contributes its own marks.
    Concurrent,
}

/// Per-node policy of a walk.
///
/// Hooks run in this order for every node: `enter_node` once, then
/// `decide_child` for each listed entry (with `after_child` right after each
/// synchronous child returns), then `after_node` once. An error from any hook
/// stops processing of that node.
pub trait Strategy: Sync {
    /// Accumulator carried through the processing of one node.
    /// Every node starts with the default value.
    type Snapshot: Default + Send;

    /// Called first for every node. Returns whether to descend into it.
    fn enter_node<N: FsNode>(
        &self,
        ctx: &mut Context<'_, N, Self::Snapshot>,
    ) -> Result<bool, HookError>;

    /// Called for every listed entry. `valid` says whether the entry can be
    /// descended into; entries that can't are never recursed, whatever is
    /// returned here.
    fn decide_child<N: FsNode>(
        &self,
        entry: &Entry,
        valid: bool,
        ctx: &mut Context<'_, N, Self::Snapshot>,
    ) -> Result<Schedule, HookError>;

    /// Called after a synchronous child finished, with its final snapshot.
    fn after_child<N: FsNode>(
        &self,
        _entry: &Entry,
        _child: Self::Snapshot,
        _succeeded: bool,
        _ctx: &mut Context<'_, N, Self::Snapshot>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once all entries have been handled. Concurrent children have
    /// been scheduled at this point, but may not have finished.
    fn after_node<N: FsNode>(
        &self,
        _ctx: &mut Context<'_, N, Self::Snapshot>,
    ) -> Result<(), HookError> {
        Ok(())
    }
}
