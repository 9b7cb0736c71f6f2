//! Concurrent, cycle-safe directory walking
//!
//! One generic traversal, [`Walker`], does the bookkeeping: concurrency
//! limit, cycle detection, error capture and result ordering. Everything
//! domain specific lives in a [`Strategy`]:
//!
//! - [`Scan`]: every node a predicate matches
//! - [`Sweep`]: every subtree that is recursively empty

mod config;
mod context;
mod gate;
mod scan;
mod strategy;
mod sweep;
mod visited;
mod walker;

pub use config::WalkerConfig;
pub use context::{Context, Mark, sort_marks};
pub use gate::{Gate, Permit};
pub use scan::{MatchFn, Scan, scan};
pub use strategy::{Schedule, Strategy};
pub use sweep::{StopFn, Sweep, sweep};
pub use visited::VisitedPaths;
pub use walker::{WalkOutcome, Walker, run};
