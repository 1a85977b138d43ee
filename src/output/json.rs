//! JSON run report for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "stats": {
//!     "total_scanned": 3,
//!     "unique_count": 2,
//!     "duplicate_count": 1,
//!     "removed_count": 1,
//!     "error_count": 0
//!   },
//!   "source_dir": "source_pdfs",
//!   "final_dir": "final_pdfs",
//!   "dry_run": false,
//!   "audit_log": "logs/duplicate_detection_20240101_120000.log",
//!   "exit_code": 0,
//!   "exit_code_name": "PD000",
//!   "finished_at": "2024-01-01T12:00:01+01:00"
//! }
//! ```

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::duplicates::{RunOptions, RunStats};
use crate::error::ExitCode;

/// Complete JSON report of one run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub stats: RunStats,
    pub source_dir: String,
    pub final_dir: String,
    /// Nothing was touched
    pub dry_run: bool,
    /// Audit log file, when one was written
    pub audit_log: Option<String>,
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "PD000")
    pub exit_code_name: String,
    pub finished_at: DateTime<Local>,
}

impl JsonReport {
    #[must_use]
    pub fn new(
        stats: RunStats,
        options: &RunOptions,
        audit_log: Option<&Path>,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            stats,
            source_dir: options.source_dir.to_string_lossy().into_owned(),
            final_dir: options.dest_dir.to_string_lossy().into_owned(),
            dry_run: options.dry_run,
            audit_log: audit_log.map(|p| p.to_string_lossy().into_owned()),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
            finished_at: Local::now(),
        }
    }

    /// Write the report followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
}
