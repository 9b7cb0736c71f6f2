//! Error types for directory walking
//!
//! Node-local failures (resolving or listing a node, inspecting one of its
//! entries) and strategy hook failures share one enum. Each of them aborts
//! only the subtree it happened in.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error returned from a strategy hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the walker.
pub type Result<T> = std::result::Result<T, WalkError>;

/// Which strategy hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    EnterNode,
    DecideChild,
    AfterChild,
    AfterNode,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::EnterNode => "enter_node",
            Hook::DecideChild => "decide_child",
            Hook::AfterChild => "after_child",
            Hook::AfterNode => "after_node",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum WalkError {
    /// The node's canonical path could not be determined.
    /// `path` is the unresolved path the node was created with.
    #[error("cannot resolve '{}': {source}", .path.display())]
    Resolve { path: PathBuf, source: io::Error },

    /// Listing the children of a node failed.
    #[error("cannot list '{}': {source}", .path.display())]
    List { path: PathBuf, source: io::Error },

    /// Deciding whether an entry can be descended into failed.
    #[error("cannot inspect '{}' in '{}': {source}", .name.to_string_lossy(), .path.display())]
    Inspect {
        path: PathBuf,
        name: OsString,
        source: io::Error,
    },

    /// A strategy hook returned an error.
    #[error("{hook} failed at '{}': {source}", .path.display())]
    Hook {
        hook: Hook,
        path: PathBuf,
        source: HookError,
    },
}

impl WalkError {
    /// The path of the node the error belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            WalkError::Resolve { path, .. }
            | WalkError::List { path, .. }
            | WalkError::Inspect { path, .. }
            | WalkError::Hook { path, .. } => path,
        }
    }
}
