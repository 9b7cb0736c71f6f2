//! Grove - find and tidy the git repositories under a directory tree

pub mod error;
pub mod filter;
pub mod git;
pub mod node;
pub mod repos;
pub mod walk;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Hook, HookError, Result, WalkError};
pub use filter::PathFilter;
pub use node::{DiskNode, Entry, EntryKind, FsNode};
pub use repos::{SearchConfig, find_empty_dirs, find_repositories, remove_dirs};
pub use walk::{Context, Mark, Scan, Schedule, Strategy, Sweep, WalkOutcome, Walker, WalkerConfig};
