//! Per-run counters.

use serde::{Deserialize, Serialize};

/// Counters accumulated over one detection run.
///
/// Invariants once a run completes:
/// - `unique_count` is the number of fingerprint groups, which is the
///   number of files kept
/// - `duplicate_count` is the sum over duplicate groups of `members - 1`
/// - `removed_count <= duplicate_count`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// PDF files found in the source folder
    pub total_scanned: usize,
    /// Distinct contents found (files kept, survivors included)
    pub unique_count: usize,
    /// Redundant copies found across all duplicate groups
    pub duplicate_count: usize,
    /// Redundant copies actually removed
    pub removed_count: usize,
    /// Per-file failures (hashing, removal, relocation)
    pub error_count: usize,
}

impl RunStats {
    /// Record one per-file failure.
    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    /// Record one successful removal.
    pub fn record_removed(&mut self) {
        self.removed_count += 1;
    }

    /// Whether any per-file failure was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Human-readable one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Scanned {} PDF(s): {} unique, {} duplicate(s) found, {} removed, {} error(s)",
            self.total_scanned,
            self.unique_count,
            self.duplicate_count,
            self.removed_count,
            self.error_count
        )
    }
}
