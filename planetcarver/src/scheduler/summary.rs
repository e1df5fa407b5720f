//! Run statistics and the end-of-run summary.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared tallies updated by tasks as they finish.
///
/// Each submitted task lands in exactly one outcome bucket, so
/// `submitted = terminal + split + failed + skipped + abandoned` holds
/// once the in-flight counter has drained.
#[derive(Debug, Default)]
pub(crate) struct RunStats {
    pub submitted: AtomicU64,
    pub extracted: AtomicU64,
    pub reused: AtomicU64,
    pub terminal: AtomicU64,
    pub split: AtomicU64,
    pub failed: AtomicU64,
    pub skipped_missing_parent: AtomicU64,
    pub skipped_parent_done: AtomicU64,
    pub abandoned: AtomicU64,
    pub sink_failures: AtomicU64,
}

impl RunStats {
    pub fn bump(field: &AtomicU64) {
        field.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            submitted: self.submitted.load(Ordering::Relaxed),
            extracted: self.extracted.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            terminal: self.terminal.load(Ordering::Relaxed),
            split: self.split.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped_missing_parent: self.skipped_missing_parent.load(Ordering::Relaxed),
            skipped_parent_done: self.skipped_parent_done.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

/// Outcome tallies for one scheduler run.
///
/// Distinguishes terminal successes from failed and skipped branches so an
/// operator can decide whether a rerun is needed and how much of it the
/// staleness check will short-circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Extraction tasks submitted to the pool.
    pub submitted: u64,
    /// Tiles freshly extracted by the external tool.
    pub extracted: u64,
    /// Tiles whose existing extent was still fresh and was reused.
    pub reused: u64,
    /// Tiles handed to the completion sink.
    pub terminal: u64,
    /// Tiles split into 4 children.
    pub split: u64,
    /// Tiles whose extraction or stat failed; their subtrees stopped.
    pub failed: u64,
    /// Tiles skipped because their parent extent was missing.
    pub skipped_missing_parent: u64,
    /// Tiles skipped because their parent was already below target size.
    pub skipped_parent_done: u64,
    /// Tiles abandoned because the run was cancelled.
    pub abandoned: u64,
    /// Terminal hand-offs that failed (extract kept on disk for rerun).
    pub sink_failures: u64,
}

impl RunSummary {
    /// Total skipped branches (both kinds).
    pub fn skipped(&self) -> u64 {
        self.skipped_missing_parent + self.skipped_parent_done
    }

    /// Returns true if every submitted task reached a terminal or split
    /// outcome with no failures, skips, or abandonment.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped() == 0 && self.abandoned == 0 && self.sink_failures == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} submitted: {} terminal, {} split, {} failed, {} skipped, {} abandoned \
             ({} extracted, {} reused, {} sink failures)",
            self.submitted,
            self.terminal,
            self.split,
            self.failed,
            self.skipped(),
            self.abandoned,
            self.extracted,
            self.reused,
            self.sink_failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_bumps() {
        let stats = RunStats::default();
        RunStats::bump(&stats.submitted);
        RunStats::bump(&stats.submitted);
        RunStats::bump(&stats.terminal);
        RunStats::bump(&stats.failed);

        let summary = stats.snapshot();
        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.terminal, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_clean_summary() {
        let summary = RunSummary {
            submitted: 4,
            terminal: 4,
            extracted: 4,
            ..Default::default()
        };
        assert!(summary.is_clean());
        assert_eq!(summary.skipped(), 0);
    }

    #[test]
    fn test_display_mentions_all_buckets() {
        let summary = RunSummary {
            submitted: 8,
            terminal: 5,
            split: 1,
            failed: 1,
            skipped_parent_done: 1,
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.contains("8 submitted"));
        assert!(text.contains("5 terminal"));
        assert!(text.contains("1 failed"));
    }
}
