//! Split scheduler
//!
//! The core of the crate: accepts the root tile, recursively decides
//! whether a tile needs splitting, and fans out up to 4 child extraction
//! tasks per split onto the tokio runtime, with the number of concurrent
//! external extractions bounded by a worker semaphore.
//!
//! # Protocol
//!
//! ```text
//! run(root)
//!   └── fan_out(root): for each of 4 children
//!         in_flight += 1          (before the task is spawned)
//!         spawn generate_tile(child)
//!               ├── parent missing / parent below target → skip
//!               ├── extent fresh → reuse (idempotent resume)
//!               ├── else extract from parent   (semaphore-bounded)
//!               ├── below target or at zoom ceiling → hand to sink
//!               └── else fan_out(child)        (children counted first)
//!         in_flight -= 1          (strictly after the body returns)
//!   └── await in_flight == 0      (Notify-signalled, not polled)
//! ```
//!
//! The increment-before-spawn / decrement-after-body ordering guarantees
//! the counter can only read zero when no task is mid-execution and no
//! further submissions are pending, which makes `run` safe to block on.
//!
//! # Failure model
//!
//! A failed extraction stops its own subtree and nothing else; skipped and
//! failed branches are tallied in the [`RunSummary`] so an operator can
//! target reruns. Reruns are cheap because fresh extents are never
//! regenerated (see [`ExtentStore::is_stale`](crate::store::ExtentStore)).

mod config;
mod core;
mod inflight;
mod summary;

pub use config::{default_worker_count, SchedulerConfig, DEFAULT_MAX_ZOOM, DEFAULT_TARGET_SIZE};
pub use self::core::{SchedulerError, SplitScheduler, TileOutcome};
pub use inflight::InFlight;
pub use summary::RunSummary;
