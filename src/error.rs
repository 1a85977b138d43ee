//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::RunStats;

/// Exit codes for the pdfdedupe binary.
///
/// - 0: Success (run completed without per-file errors, or files compared equal)
/// - 1: General error (the run could not start or failed outright)
/// - 2: Partial success (completed with per-file errors, or files differ)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    PartialSuccess = 2,
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "PD000",
            Self::GeneralError => "PD001",
            Self::PartialSuccess => "PD002",
            Self::Interrupted => "PD130",
        }
    }

    /// Exit code for a run that returned `stats`.
    #[must_use]
    pub fn from_stats(stats: &RunStats) -> Self {
        if stats.has_errors() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "PD001")
    pub code: String,
    pub exit_code: i32,
    pub message: String,
    pub interrupted: bool,
    /// Counters gathered before an interruption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        let stats = match err.downcast_ref::<crate::duplicates::RunError>() {
            Some(crate::duplicates::RunError::Interrupted { stats }) => Some(*stats),
            _ => None,
        };
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
            stats,
        }
    }
}

/// Map an application error to its exit code.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<crate::duplicates::RunError>() {
        Some(crate::duplicates::RunError::Interrupted { .. }) => ExitCode::Interrupted,
        _ => ExitCode::GeneralError,
    }
}
