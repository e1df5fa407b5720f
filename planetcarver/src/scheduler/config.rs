//! Scheduler configuration.

use crate::tile::MAX_ZOOM_LIMIT;

/// Default target extract size: 1.5 GB (decimal), matching the size a
/// downstream relational import can digest in one sitting.
pub const DEFAULT_TARGET_SIZE: u64 = 1_500_000_000;

/// Default zoom ceiling below which splitting stops unconditionally.
pub const DEFAULT_MAX_ZOOM: u8 = 9;

/// CPU cores reserved for the runtime and the downstream sink work.
const RESERVED_CPU_MARGIN: usize = 2;

/// Fallback worker count when CPU parallelism cannot be detected.
const FALLBACK_WORKER_COUNT: usize = 4;

/// Returns the default worker-pool size: available parallelism minus a
/// reserved margin, but at least one worker.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKER_COUNT)
        .saturating_sub(RESERVED_CPU_MARGIN)
        .max(1)
}

/// Configuration values consumed by the [`SplitScheduler`](super::SplitScheduler).
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Byte threshold below which a tile is terminal and not split further.
    pub target_size: u64,
    /// Maximum zoom depth; tiles at this zoom are terminal regardless of size.
    pub max_zoom: u8,
    /// Number of concurrent external extractions.
    pub workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            max_zoom: DEFAULT_MAX_ZOOM,
            workers: default_worker_count(),
        }
    }
}

impl SchedulerConfig {
    /// Sets the target extract size in bytes (builder pattern).
    pub fn with_target_size(mut self, bytes: u64) -> Self {
        self.target_size = bytes;
        self
    }

    /// Sets the zoom ceiling, clamped to [`MAX_ZOOM_LIMIT`] (builder pattern).
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom.min(MAX_ZOOM_LIMIT);
        self
    }

    /// Sets the worker-pool size; at least one worker (builder pattern).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_worker_count_is_at_least_one() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn test_builder_clamps_degenerate_values() {
        let config = SchedulerConfig::default()
            .with_workers(0)
            .with_max_zoom(u8::MAX);
        assert_eq!(config.workers, 1);
        assert_eq!(config.max_zoom, MAX_ZOOM_LIMIT);
    }

    #[test]
    fn test_builder_sets_values() {
        let config = SchedulerConfig::default()
            .with_target_size(1000)
            .with_max_zoom(2)
            .with_workers(8);
        assert_eq!(config.target_size, 1000);
        assert_eq!(config.max_zoom, 2);
        assert_eq!(config.workers, 8);
    }
}
