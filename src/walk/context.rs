//! Per-node traversal context and result records

use std::cmp::Ordering;
use std::ffi::OsString;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::node::{Entry, FsNode};

/// A node marked as part of the output, with the score it was marked with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mark {
    pub path: PathBuf,
    pub score: i64,
}

/// Order marks by score descending, then by path ascending.
///
/// Paths compare by their raw bytes, so `a-b` sorts before `a/b`.
pub fn sort_marks(marks: &mut [Mark]) {
    marks.sort_by(compare_marks);
}

fn compare_marks(a: &Mark, b: &Mark) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.path.as_os_str().cmp(b.path.as_os_str()))
}

/// Result records collected by every unit of a walk.
#[derive(Debug)]
pub(crate) struct Marks {
    records: Mutex<Vec<Mark>>,
}

impl Marks {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn push(&self, mark: Mark) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mark);
    }

    pub(crate) fn into_sorted(self) -> Vec<Mark> {
        let mut records = self
            .records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        sort_marks(&mut records);
        records
    }
}

/// Free list of path buffers, so contexts don't allocate a fresh path for
/// every node.
#[derive(Debug, Default)]
pub(crate) struct PathPool {
    free: Mutex<Vec<Vec<OsString>>>,
}

impl PathPool {
    const MAX_FREE: usize = 256;

    fn take(&self) -> Vec<OsString> {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default()
    }

    pub(crate) fn give(&self, mut path: Vec<OsString>) {
        path.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < Self::MAX_FREE {
            free.push(path);
        }
    }
}

/// A node waiting to be processed, along with where it sits in its walk.
pub(crate) struct Unit<'w, N> {
    pub(crate) root: &'w N,
    /// Canonical path of the walk root; `None` while the root itself is pending.
    pub(crate) root_path: Option<Arc<Path>>,
    pub(crate) node: N,
    pub(crate) path: Vec<OsString>,
}

impl<'w, N> Unit<'w, N> {
    pub(crate) fn root(root: &'w N) -> Self
    where
        N: Clone,
    {
        Self {
            root,
            root_path: None,
            node: root.clone(),
            path: Vec::new(),
        }
    }
}

/// Handle on the node currently being processed.
///
/// A context is owned by the unit processing its node. Children get their
/// own path and snapshot while sharing the root and the result records.
pub struct Context<'w, N, S> {
    root: &'w N,
    root_path: Arc<Path>,
    node: N,
    node_path: PathBuf,
    path: Vec<OsString>,
    snapshot: S,
    marks: &'w Marks,
    pool: &'w PathPool,
}

impl<'w, N: FsNode, S: Default> Context<'w, N, S> {
    pub(crate) fn new(
        unit: Unit<'w, N>,
        node_path: PathBuf,
        marks: &'w Marks,
        pool: &'w PathPool,
    ) -> Self {
        let root_path = unit
            .root_path
            .unwrap_or_else(|| Arc::from(node_path.as_path()));
        Self {
            root: unit.root,
            root_path,
            node: unit.node,
            node_path,
            path: unit.path,
            snapshot: S::default(),
            marks,
            pool,
        }
    }

    /// Derive the unit for a recursable child entry.
    pub(crate) fn child(&self, entry: &Entry) -> Unit<'w, N> {
        let mut path = self.pool.take();
        path.extend(self.path.iter().cloned());
        path.push(entry.name().to_owned());
        Unit {
            root: self.root,
            root_path: Some(Arc::clone(&self.root_path)),
            node: self.node.child(&self.node_path, entry),
            path,
        }
    }

    /// Replace the snapshot with `f(current)`.
    pub fn update_snapshot(&mut self, f: impl FnOnce(S) -> S) {
        let current = mem::take(&mut self.snapshot);
        self.snapshot = f(current);
    }

    pub(crate) fn into_snapshot(mut self) -> S {
        mem::take(&mut self.snapshot)
    }
}

impl<'w, N, S> Context<'w, N, S> {
    /// The root node of the walk this node belongs to.
    pub fn root(&self) -> &N {
        self.root
    }

    /// Canonical path of the walk root.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// Canonical path of the current node.
    pub fn node_path(&self) -> &Path {
        &self.node_path
    }

    /// Names of the entries leading from the root to the current node.
    pub fn path(&self) -> &[OsString] {
        &self.path
    }

    /// Number of steps from the root; the root itself has depth 0.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    /// Add a result record for the current node.
    pub fn mark(&self, score: i64) {
        self.marks.push(Mark {
            path: self.node_path.clone(),
            score,
        });
    }
}

impl<N, S> Drop for Context<'_, N, S> {
    fn drop(&mut self) {
        self.pool.give(mem::take(&mut self.path));
    }
}
