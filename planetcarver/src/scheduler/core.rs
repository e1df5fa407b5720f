//! Split scheduler core - state machine, fan-out, completion detection.

use super::config::SchedulerConfig;
use super::inflight::InFlight;
use super::summary::{RunStats, RunSummary};
use crate::extract::Extractor;
use crate::sink::CompletionSink;
use crate::store::ExtentStore;
use crate::tile::Tile;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that abort a scheduler run before any fan-out happens.
///
/// Once fan-out has started, failures stay localized to their subtree and
/// are reported through the [`RunSummary`] instead.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The root extent was not seeded in the working directory.
    #[error("Root extent missing at {path}; seed the planet dump before running")]
    MissingRoot {
        /// Expected root extent path
        path: PathBuf,
    },

    /// The root extent could not be inspected.
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Terminal state a tile task ends in.
///
/// Every submitted task resolves to exactly one of these; together with
/// the in-flight counter they make completion accounting exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// Parent extent missing; should not occur under correct ordering, but
    /// must not crash.
    SkippedMissingParent,
    /// Parent was already below target size; children are not needed.
    SkippedParentDone,
    /// Extent reached target size (or the zoom ceiling) and was handed to
    /// the completion sink.
    Terminal,
    /// Extent still above target; 4 child tasks were submitted.
    Split,
    /// Extraction or stat failed; this subtree stops here.
    Failed,
    /// The run was cancelled before this task could finish.
    Abandoned,
}

/// The recursive quadtree splitting scheduler.
///
/// Constructed once with its injected collaborators and configuration, so
/// multiple independent schedulers can run (and be tested) in the same
/// process without shared globals.
pub struct SplitScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    store: ExtentStore,
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn CompletionSink>,
    config: SchedulerConfig,
    workers: Semaphore,
    in_flight: InFlight,
    stats: RunStats,
}

impl SplitScheduler {
    /// Creates a scheduler over the given store and collaborators.
    pub fn new(
        store: ExtentStore,
        extractor: Arc<dyn Extractor>,
        sink: Arc<dyn CompletionSink>,
        config: SchedulerConfig,
    ) -> Self {
        let workers = Semaphore::new(config.workers);
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                extractor,
                sink,
                config,
                workers,
                in_flight: InFlight::new(),
                stats: RunStats::default(),
            }),
        }
    }

    /// Runs the splitter to completion, starting from the root tile.
    ///
    /// The root extent (`0_0_0.pbf`) must already exist in the working
    /// directory; it is never re-extracted and never deleted. Blocks until
    /// the in-flight counter returns to zero, then reports the run
    /// summary. Cancelling `shutdown` stops new submissions, kills running
    /// extractions best-effort, and lets the counter drain; the number of
    /// abandoned tasks is reported in the summary.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<RunSummary, SchedulerError> {
        let inner = &self.inner;
        let root = Tile::ROOT;

        if !inner.store.exists(root) {
            return Err(SchedulerError::MissingRoot {
                path: inner.store.path(root),
            });
        }
        let root_size = inner.store.size_bytes(root)?;

        if root_size < inner.config.target_size {
            // Degenerate input: the whole dataset already fits the target.
            info!(
                size = root_size,
                target = inner.config.target_size,
                "root extent already below target size"
            );
            inner.hand_off(root).await;
            RunStats::bump(&inner.stats.terminal);
            return Ok(self.summary());
        }
        if inner.config.max_zoom == 0 {
            warn!(
                size = root_size,
                "zoom ceiling is 0; root handed off above target size"
            );
            inner.hand_off(root).await;
            RunStats::bump(&inner.stats.terminal);
            return Ok(self.summary());
        }

        info!(
            size = root_size,
            target = inner.config.target_size,
            max_zoom = inner.config.max_zoom,
            workers = inner.config.workers,
            "splitting root extent"
        );
        Arc::clone(inner).fan_out(root, shutdown.clone());
        inner.in_flight.wait_zero().await;

        let summary = self.summary();
        if shutdown.is_cancelled() {
            warn!(abandoned = summary.abandoned, "run cancelled; {}", summary);
        } else {
            info!("run complete; {}", summary);
        }
        Ok(summary)
    }

    /// Returns the current number of in-flight tasks (0 after [`run`](Self::run)).
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.current()
    }

    /// Returns a snapshot of the run tallies.
    pub fn summary(&self) -> RunSummary {
        self.inner.stats.snapshot()
    }
}

impl SchedulerInner {
    /// Submits one extraction task per child of `source`.
    ///
    /// The in-flight counter is incremented before each task is spawned,
    /// so the pool can never drain to zero while a submission is still
    /// being prepared. Called both from `run` (with the root) and from a
    /// splitting task's own body (before that task decrements itself).
    fn fan_out(self: Arc<Self>, source: Tile, shutdown: CancellationToken) {
        debug_assert!(source.z < self.config.max_zoom, "fan-out past zoom ceiling");
        for child in source.children() {
            if shutdown.is_cancelled() {
                debug!(%child, "not submitting: run cancelled");
                continue;
            }
            self.in_flight.increment();
            RunStats::bump(&self.stats.submitted);

            let inner = Arc::clone(&self);
            let token = shutdown.clone();
            tokio::spawn(async move {
                let outcome = Arc::clone(&inner).generate_tile(child, token).await;
                inner.finish(child, outcome);
            });
        }
    }

    /// Tallies a finished task and releases its in-flight slot.
    ///
    /// The decrement comes last: by then any children the task fanned out
    /// have already been counted, so a zero reading is conclusive.
    fn finish(&self, tile: Tile, outcome: TileOutcome) {
        let bucket = match outcome {
            TileOutcome::SkippedMissingParent => &self.stats.skipped_missing_parent,
            TileOutcome::SkippedParentDone => &self.stats.skipped_parent_done,
            TileOutcome::Terminal => &self.stats.terminal,
            TileOutcome::Split => &self.stats.split,
            TileOutcome::Failed => &self.stats.failed,
            TileOutcome::Abandoned => &self.stats.abandoned,
        };
        RunStats::bump(bucket);
        debug!(%tile, ?outcome, "task finished");
        self.in_flight.decrement();
    }

    /// Generates a single tile from its parent and decides what happens to
    /// the subtree below it.
    async fn generate_tile(self: Arc<Self>, tile: Tile, shutdown: CancellationToken) -> TileOutcome {
        let Some(parent) = tile.parent() else {
            // The root is never submitted as a task; reaching this is a
            // precondition violation, not a runtime failure.
            warn!(%tile, "not generating: tile has no parent");
            return TileOutcome::SkippedMissingParent;
        };

        if !self.store.exists(parent) {
            warn!(%tile, %parent, "not generating: parent extent does not exist");
            return TileOutcome::SkippedMissingParent;
        }
        let parent_size = match self.store.size_bytes(parent) {
            Ok(size) => size,
            Err(e) => {
                error!(%tile, %parent, error = %e, "failed to stat parent extent");
                return TileOutcome::Failed;
            }
        };
        if parent_size < self.config.target_size {
            debug!(%tile, %parent, "not generating: parent has reached target size");
            return TileOutcome::SkippedParentDone;
        }

        match self.store.is_stale(tile, parent) {
            Ok(false) => {
                // Idempotent resume: a prior run already produced this
                // extent and the parent has not changed since.
                info!(%tile, "extent exists and is current, skipping extraction");
                RunStats::bump(&self.stats.reused);
            }
            Ok(true) => {
                if let Some(outcome) = self.extract_tile(tile, parent, &shutdown).await {
                    return outcome;
                }
            }
            Err(e) => {
                error!(%tile, error = %e, "failed to determine extent staleness");
                return TileOutcome::Failed;
            }
        }

        let size = match self.store.size_bytes(tile) {
            Ok(size) => size,
            Err(e) => {
                error!(%tile, error = %e, "failed to stat generated extent");
                return TileOutcome::Failed;
            }
        };

        if size < self.config.target_size {
            info!(%tile, size, "tile has reached target size");
            self.hand_off(tile).await;
            return TileOutcome::Terminal;
        }
        if tile.z >= self.config.max_zoom {
            // Bounded recursion: the splitting criterion is open-ended but
            // the tree is cut off at the configured ceiling.
            warn!(
                %tile,
                size,
                target = self.config.target_size,
                "zoom ceiling reached; handing off above target size"
            );
            self.hand_off(tile).await;
            return TileOutcome::Terminal;
        }

        debug!(%tile, size, "still above target size, splitting");
        Arc::clone(&self).fan_out(tile, shutdown);
        TileOutcome::Split
    }

    /// Runs the external extractor for `tile`, bounded by the worker pool.
    ///
    /// Returns `None` on success, or the task's final outcome on failure
    /// or cancellation.
    async fn extract_tile(
        &self,
        tile: Tile,
        parent: Tile,
        shutdown: &CancellationToken,
    ) -> Option<TileOutcome> {
        let permit = tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(%tile, "abandoning before extraction: run cancelled");
                return Some(TileOutcome::Abandoned);
            }
            permit = self.workers.acquire() => match permit {
                Ok(permit) => permit,
                // The pool is never closed; treat it like cancellation.
                Err(_) => return Some(TileOutcome::Abandoned),
            },
        };

        info!(%tile, "generating extent from {parent}");
        let parent_path = self.store.path(parent);
        let output_path = self.store.path(tile);

        let result = tokio::select! {
            _ = shutdown.cancelled() => {
                // Dropping the extractor future kills the subprocess.
                warn!(%tile, "extraction aborted: run cancelled");
                return Some(TileOutcome::Abandoned);
            }
            result = self
                .extractor
                .materialize(&parent_path, tile.bounds(), &output_path) => result,
        };
        drop(permit);

        match result {
            Ok(()) => {
                RunStats::bump(&self.stats.extracted);
                None
            }
            Err(e) => {
                error!(%tile, error = %e, "extraction failed; subtree stops here");
                Some(TileOutcome::Failed)
            }
        }
    }

    /// Hands a terminal tile to the completion sink.
    ///
    /// Sink failures are tallied but do not change the tile's outcome; the
    /// extent stays in the working directory so a rerun can retry the
    /// hand-off without re-extracting.
    async fn hand_off(&self, tile: Tile) {
        let path = self.store.path(tile);
        if let Err(e) = self.sink.on_terminal_tile(tile, &path).await {
            error!(%tile, error = %e, "completion sink failed; extent kept for rerun");
            RunStats::bump(&self.stats.sink_failures);
        }
    }
}
