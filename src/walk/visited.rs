//! Record of canonical paths already processed in a walk

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Set of canonical paths, safe to share between traversal units.
///
/// Checking and recording happen under one lock so that, when two units race
/// to record the same path, exactly one of them wins.
#[derive(Debug, Default)]
pub struct VisitedPaths {
    paths: Mutex<HashSet<PathBuf>>,
}

impl VisitedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`. Returns false if it had already been recorded.
    pub fn insert(&self, path: &Path) -> bool {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if paths.contains(path) {
            return false;
        }
        paths.insert(path.to_path_buf())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
