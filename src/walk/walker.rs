//! Walker - drives a strategy over one or more directory trees
//!
//! Every node is handled by one traversal unit. Units run on a rayon scope,
//! so `walk` returns only once every unit it spawned has finished. A shared
//! [`Gate`] caps how many units run at once and a shared [`VisitedPaths`]
//! makes sure no canonical path is processed twice, which breaks link cycles
//! and collapses trees reachable from more than one root.
//!
//! Errors don't cancel anything: units already scheduled run to completion
//! and the first error captured is the one `walk` returns.

use std::iter;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::thread;

use rayon::Scope;
use tracing::{debug, trace};

use crate::error::{Hook, HookError, Result, WalkError};
use crate::node::FsNode;

use super::config::WalkerConfig;
use super::context::{Context, Mark, Marks, PathPool, Unit};
use super::gate::Gate;
use super::strategy::{Schedule, Strategy};
use super::visited::VisitedPaths;

enum State {
    Ready,
    Started,
    Done { paths: Vec<PathBuf>, scores: Vec<i64> },
}

/// Walks one or more roots with a [`Strategy`].
///
/// A walker runs exactly once. The visited record and the result buffers
/// belong to that one run, so a second call to [`Walker::walk`] panics, as
/// does reading results before a walk completed.
pub struct Walker<N, St> {
    root: N,
    extra_roots: Vec<N>,
    config: WalkerConfig,
    strategy: St,
    state: State,
}

impl<N: FsNode, St: Strategy> Walker<N, St> {
    pub fn new(root: N, strategy: St) -> Self {
        Self {
            root,
            extra_roots: Vec::new(),
            config: WalkerConfig::default(),
            strategy,
            state: State::Ready,
        }
    }

    /// Walk these roots as well, sharing the visited record and the gate.
    pub fn with_extra_roots(mut self, roots: impl IntoIterator<Item = N>) -> Self {
        self.extra_roots.extend(roots);
        self
    }

    pub fn with_config(mut self, config: WalkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strategy(&self) -> &St {
        &self.strategy
    }

    /// Run the walk to completion and return the first error any unit hit.
    ///
    /// Results are available afterwards even when an error is returned; they
    /// then describe the part of the tree that was processed.
    ///
    /// # Panics
    ///
    /// When called more than once on the same walker.
    pub fn walk(&mut self) -> Result<()> {
        if !matches!(self.state, State::Ready) {
            panic!("Walker::walk called more than once on the same walker");
        }
        self.state = State::Started;

        let shared = Shared::new(&self.strategy, &self.config);
        let roots: Vec<&N> = iter::once(&self.root)
            .chain(self.extra_roots.iter())
            .collect();
        debug!(
            roots = roots.len(),
            limit = ?shared.gate.limit(),
            "starting walk"
        );

        // The roots run inline on the permit taken here; every concurrent
        // child takes its own.
        let drive = || {
            rayon::scope(|scope| {
                let _permit = shared.gate.acquire();
                for &root in &roots {
                    shared.run(scope, Unit::root(root));
                }
            })
        };

        match self.config.limit() {
            Some(limit) => match rayon::ThreadPoolBuilder::new()
                .num_threads(pool_threads(limit))
                .build()
            {
                Ok(pool) => pool.install(drive),
                Err(e) => {
                    debug!(error = %e, "cannot build thread pool, using the global one");
                    drive()
                }
            },
            None => drive(),
        }

        let Shared { marks, error, .. } = shared;
        let error = error.into_inner();
        let marks = marks.into_sorted();
        debug!(
            results = marks.len(),
            failed = error.is_some(),
            "walk finished"
        );

        let (paths, scores): (Vec<PathBuf>, Vec<i64>) =
            marks.into_iter().map(|m| (m.path, m.score)).unzip();
        self.state = State::Done { paths, scores };

        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Marked paths, highest score first, ties broken by path.
    ///
    /// # Panics
    ///
    /// When the walk has not completed.
    pub fn results(&self) -> &[PathBuf] {
        match &self.state {
            State::Done { paths, .. } => paths,
            _ => panic!("Walker::results called before the walk completed"),
        }
    }

    /// Scores parallel to [`Walker::results`].
    ///
    /// # Panics
    ///
    /// When the walk has not completed.
    pub fn scores(&self) -> &[i64] {
        match &self.state {
            State::Done { scores, .. } => scores,
            _ => panic!("Walker::scores called before the walk completed"),
        }
    }

    /// Results paired with their scores.
    ///
    /// # Panics
    ///
    /// When the walk has not completed.
    pub fn marks(&self) -> impl Iterator<Item = (&Path, i64)> {
        self.results()
            .iter()
            .map(PathBuf::as_path)
            .zip(self.scores().iter().copied())
    }

    /// Consume the walker, returning its result records in order.
    ///
    /// # Panics
    ///
    /// When the walk has not completed.
    pub fn into_marks(self) -> Vec<Mark> {
        match self.state {
            State::Done { paths, scores } => paths
                .into_iter()
                .zip(scores)
                .map(|(path, score)| Mark { path, score })
                .collect(),
            _ => panic!("Walker::into_marks called before the walk completed"),
        }
    }
}

/// Ordered results of a finished walk, next to the first error it hit.
#[derive(Debug)]
pub struct WalkOutcome {
    pub marks: Vec<Mark>,
    pub error: Option<WalkError>,
}

impl WalkOutcome {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.marks.iter().map(|m| m.path.as_path())
    }
}

/// Build a walker, run it, and collect what it found.
pub fn run<N: FsNode, St: Strategy>(
    root: N,
    extra_roots: impl IntoIterator<Item = N>,
    config: WalkerConfig,
    strategy: St,
) -> WalkOutcome {
    let mut walker = Walker::new(root, strategy)
        .with_extra_roots(extra_roots)
        .with_config(config);
    let error = walker.walk().err();
    WalkOutcome {
        marks: walker.into_marks(),
        error,
    }
}

/// State shared by every unit of one walk.
struct Shared<'w, St> {
    strategy: &'w St,
    visited: VisitedPaths,
    gate: Gate,
    marks: Marks,
    pool: PathPool,
    error: OnceLock<WalkError>,
}

impl<'w, St: Strategy> Shared<'w, St> {
    fn new(strategy: &'w St, config: &WalkerConfig) -> Self {
        Self {
            strategy,
            visited: VisitedPaths::new(),
            gate: Gate::new(config.limit()),
            marks: Marks::with_capacity(config.buffer_size),
            pool: PathPool::default(),
            error: OnceLock::new(),
        }
    }

    /// Process one unit, capturing its error. Returns the final snapshot and
    /// whether the unit succeeded.
    fn run<N: FsNode + 'w>(
        &'w self,
        scope: &Scope<'w>,
        unit: Unit<'w, N>,
    ) -> (St::Snapshot, bool) {
        match self.process(scope, unit) {
            Ok(snapshot) => (snapshot, true),
            Err(err) => {
                self.fail(err);
                (St::Snapshot::default(), false)
            }
        }
    }

    fn fail(&self, err: WalkError) {
        match self.error.set(err) {
            Ok(()) => debug!("captured walk error"),
            Err(err) => debug!(error = %err, "dropping walk error, one was already captured"),
        }
    }

    fn process<N: FsNode + 'w>(
        &'w self,
        scope: &Scope<'w>,
        unit: Unit<'w, N>,
    ) -> Result<St::Snapshot> {
        let node_path = match unit.node.canonical_path() {
            Ok(path) => path,
            Err(source) => {
                let path = unit.node.path_hint();
                self.pool.give(unit.path);
                return Err(WalkError::Resolve { path, source });
            }
        };

        if !self.visited.insert(&node_path) {
            trace!(path = %node_path.display(), "already visited");
            self.pool.give(unit.path);
            return Ok(St::Snapshot::default());
        }

        let mut ctx = Context::new(unit, node_path, &self.marks, &self.pool);
        trace!(path = %ctx.node_path().display(), depth = ctx.depth(), "entering node");

        let descend = self
            .strategy
            .enter_node(&mut ctx)
            .map_err(|source| hook_error(Hook::EnterNode, &ctx, source))?;
        if !descend {
            return Ok(ctx.into_snapshot());
        }

        let entries = ctx
            .node()
            .list_children(ctx.node_path())
            .map_err(|source| WalkError::List {
                path: ctx.node_path().to_path_buf(),
                source,
            })?;

        for entry in &entries {
            let valid = ctx
                .node()
                .can_descend(ctx.node_path(), entry)
                .map_err(|source| WalkError::Inspect {
                    path: ctx.node_path().to_path_buf(),
                    name: entry.name().to_owned(),
                    source,
                })?;

            let schedule = self
                .strategy
                .decide_child(entry, valid, &mut ctx)
                .map_err(|source| hook_error(Hook::DecideChild, &ctx, source))?;
            if !valid {
                continue;
            }

            match schedule {
                Schedule::Skip => {}
                Schedule::Synchronous => {
                    let (child, succeeded) = self.run(scope, ctx.child(entry));
                    self.strategy
                        .after_child(entry, child, succeeded, &mut ctx)
                        .map_err(|source| hook_error(Hook::AfterChild, &ctx, source))?;
                }
                Schedule::Concurrent => {
                    let unit = ctx.child(entry);
                    scope.spawn(move |scope| {
                        let _permit = self.gate.acquire();
                        self.run(scope, unit);
                    });
                }
            }
        }

        self.strategy
            .after_node(&mut ctx)
            .map_err(|source| hook_error(Hook::AfterNode, &ctx, source))?;

        Ok(ctx.into_snapshot())
    }
}

/// Threads for a walk limited to `limit` units: at most one per available
/// core. The gate enforces the limit itself.
fn pool_threads(limit: usize) -> usize {
    let available = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    limit.min(available)
}

fn hook_error<N, S>(hook: Hook, ctx: &Context<'_, N, S>, source: HookError) -> WalkError {
    WalkError::Hook {
        hook,
        path: ctx.node_path().to_path_buf(),
        source,
    }
}
