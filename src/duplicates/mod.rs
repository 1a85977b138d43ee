//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping files by content fingerprint
//! - Choosing the survivor of each duplicate group
//! - Run counters ([`RunStats`])
//! - The end-to-end detection run ([`DetectionRun`])

pub mod finder;
pub mod groups;
pub mod stats;

pub use finder::{DetectionRun, RunError, RunOptions, RunPhase};
pub use groups::{
    group_by_fingerprint, group_hashed, select_survivor, DuplicateGroup, GroupingOutcome,
    Selection,
};
pub use stats::RunStats;
