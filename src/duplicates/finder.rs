//! Detection run orchestrator.
//!
//! # Overview
//!
//! A [`DetectionRun`] takes one snapshot of a source folder and drives it
//! through a fixed sequence of phases:
//!
//! 1. **Scanning**: list the PDF files of the source folder
//! 2. **Hashing**: SHA-256 every file (in parallel when `io_threads > 1`)
//! 3. **Grouping**: partition files by fingerprint
//! 4. **Reconciling**: remove every copy but the survivor of each duplicate
//!    group, then move survivors and unique files to the destination
//! 5. **Reporting**: write the summary and return [`RunStats`]
//!
//! Only a source folder that cannot be listed (or a destination that cannot
//! be created) stops a run. Every other failure is tied to one file,
//! counted in [`RunStats::error_count`], written to the audit log, and the
//! run moves on.
//!
//! # Example
//!
//! ```no_run
//! use pdfdedupe::duplicates::{DetectionRun, RunOptions};
//!
//! let options = RunOptions::new("source_pdfs", "final_pdfs").with_io_threads(4);
//! match DetectionRun::new(options).run() {
//!     Ok(stats) => println!("{}", stats.summary()),
//!     Err(e) => eprintln!("Run failed: {}", e),
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;

use super::groups::{group_hashed, select_survivor};
use super::RunStats;
use crate::actions::{Relocator, RemovalMode};
use crate::audit::AuditLog;
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::scanner::{scan_pdfs, ContentHasher, FileRecord, Fingerprint, HashError, ScanError};

/// States of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Idle,
    Scanning,
    Hashing,
    Grouping,
    Reconciling,
    Reporting,
    Done,
    Failed,
    Interrupted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Hashing => "hashing",
            Self::Grouping => "grouping",
            Self::Reconciling => "reconciling",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// Inputs of one detection run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Folder holding the PDFs to deduplicate
    pub source_dir: PathBuf,
    /// Folder receiving the kept files (created if absent)
    pub dest_dir: PathBuf,
    /// Threads used for hashing; 1 hashes sequentially
    pub io_threads: usize,
    /// How redundant copies are removed
    pub removal: RemovalMode,
    /// Decide everything but touch nothing
    pub dry_run: bool,
}

impl RunOptions {
    /// Options with 4 hashing threads and permanent removal.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            io_threads: 4,
            removal: RemovalMode::Permanent,
            dry_run: false,
        }
    }

    /// Set the hashing thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set how duplicates are removed.
    #[must_use]
    pub fn with_removal_mode(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Errors that end a run before it completes.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The source folder is missing or unreadable.
    #[error("Source folder unusable: {0}")]
    Directory(#[from] ScanError),

    /// The destination folder could not be created.
    #[error("Cannot create destination folder {path}: {source}")]
    Destination {
        /// Destination folder
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Source and destination name the same folder.
    #[error("Destination folder is the source folder: {0}")]
    SameFolder(PathBuf),

    /// The run was cancelled between two file operations.
    #[error("Run interrupted by user")]
    Interrupted {
        /// Counters at the moment of interruption
        stats: RunStats,
    },
}

/// One scan → hash → group → reconcile pass over a source folder.
pub struct DetectionRun {
    options: RunOptions,
    hasher: ContentHasher,
    relocator: Relocator,
    audit: Arc<AuditLog>,
    progress: Option<Arc<dyn ProgressCallback>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    phase: RunPhase,
    stats: RunStats,
}

impl fmt::Debug for DetectionRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionRun")
            .field("options", &self.options)
            .field("audit", &self.audit)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .field("shutdown_flag", &self.shutdown_flag)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish()
    }
}

impl DetectionRun {
    /// Create an idle run.
    #[must_use]
    pub fn new(options: RunOptions) -> Self {
        let relocator = Relocator::new(&options.dest_dir).with_removal_mode(options.removal);
        Self {
            options,
            hasher: ContentHasher::new(),
            relocator,
            audit: Arc::new(AuditLog::disabled()),
            progress: None,
            shutdown_flag: None,
            phase: RunPhase::Idle,
            stats: RunStats::default(),
        }
    }

    /// Write audit lines to `audit`.
    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Send progress events to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Stop at the next checkpoint once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Options this run was created with.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Execute the run to completion.
    ///
    /// # Errors
    ///
    /// - [`RunError::Directory`] if the source folder cannot be listed
    /// - [`RunError::SameFolder`] if the destination is the source folder
    /// - [`RunError::Destination`] if the destination cannot be created
    /// - [`RunError::Interrupted`] if the shutdown flag was set
    pub fn run(mut self) -> Result<RunStats, RunError> {
        self.audit.info("=".repeat(60));
        self.audit.info("Starting Duplicate PDF Detection Process");
        self.audit.info("=".repeat(60));

        match self.run_phases() {
            Ok(()) => {
                self.enter(RunPhase::Done, 0);
                self.emit(ProgressEvent::Completed { stats: self.stats });
                Ok(self.stats)
            }
            Err(err) => {
                let terminal = if matches!(err, RunError::Interrupted { .. }) {
                    RunPhase::Interrupted
                } else {
                    RunPhase::Failed
                };
                self.enter(terminal, 0);
                self.audit.error(format_args!("Run stopped: {err}"));
                self.emit(ProgressEvent::Failed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn run_phases(&mut self) -> Result<(), RunError> {
        self.enter(RunPhase::Scanning, 0);
        self.audit.info(format_args!(
            "Scanning folder: {}",
            self.options.source_dir.display()
        ));
        let files = scan_pdfs(&self.options.source_dir)?;
        self.check_distinct_folders()?;
        self.stats.total_scanned = files.len();
        self.audit
            .info(format_args!("Found {} PDF files", self.stats.total_scanned));
        for file in &files {
            self.audit.info(format_args!(
                "Scanned: {} ({})",
                file.display_name(),
                ByteSize(file.size)
            ));
        }
        self.finish(RunPhase::Scanning);

        if files.is_empty() {
            self.audit.warn("No PDF files found in source folder");
            self.report();
            return Ok(());
        }
        self.checkpoint()?;

        let hashed = self.hash_all(files);
        self.checkpoint()?;

        self.enter(RunPhase::Grouping, 0);
        let outcome = group_hashed(hashed);
        for (file, err) in &outcome.failures {
            self.stats.record_error();
            self.audit.error(format_args!(
                "Error reading PDF {}: {}",
                file.path.display(),
                err
            ));
        }
        self.stats.unique_count = outcome.unique_count();
        self.stats.duplicate_count = outcome.duplicate_count();
        self.audit.info(format_args!(
            "Found {} groups of duplicate PDFs",
            outcome.duplicate_groups().count()
        ));
        self.audit
            .info(format_args!("Unique PDFs: {}", self.stats.unique_count));
        self.audit.info(format_args!(
            "Duplicate PDFs to remove: {}",
            self.stats.duplicate_count
        ));
        self.finish(RunPhase::Grouping);
        self.checkpoint()?;

        if !self.options.dry_run {
            self.relocator
                .ensure_destination()
                .map_err(|source| RunError::Destination {
                    path: self.options.dest_dir.clone(),
                    source,
                })?;
        }

        let kept_total = outcome.groups.len();
        self.enter(RunPhase::Reconciling, self.stats.duplicate_count + kept_total);
        let mut done = 0;
        let mut kept = Vec::with_capacity(kept_total);
        for group in outcome.groups {
            if !group.is_duplicate() {
                kept.extend(group.members);
                continue;
            }

            self.emit(ProgressEvent::GroupFound {
                fingerprint: group.fingerprint,
                members: group.len(),
            });
            let Some(selection) = select_survivor(&group) else {
                continue;
            };
            self.audit.info(format_args!(
                "Processing duplicate group (hash: {}...) with {} PDFs, {} reclaimable",
                group.fingerprint.short(16),
                group.len(),
                ByteSize(group.wasted_bytes())
            ));
            self.audit.info(format_args!(
                "  Keeping: {}",
                selection.survivor.display_name()
            ));

            for duplicate in &selection.to_remove {
                self.checkpoint()?;
                self.remove_duplicate(duplicate);
                done += 1;
                self.advance(RunPhase::Reconciling, done, &duplicate.path);
            }
            kept.push(selection.survivor);
        }

        kept.sort_by(FileRecord::cmp_by_name);
        self.audit.info("Moving unique PDFs to final folder...");
        for file in &kept {
            self.checkpoint()?;
            self.relocate_kept(file);
            done += 1;
            self.advance(RunPhase::Reconciling, done, &file.path);
        }
        self.finish(RunPhase::Reconciling);

        self.report();
        Ok(())
    }

    /// A destination that resolves to the source would rename every kept
    /// file onto itself with a `_1` suffix.
    fn check_distinct_folders(&self) -> Result<(), RunError> {
        let Ok(source) = std::fs::canonicalize(&self.options.source_dir) else {
            return Ok(());
        };
        match std::fs::canonicalize(&self.options.dest_dir) {
            Ok(dest) if dest == source => Err(RunError::SameFolder(source)),
            _ => Ok(()),
        }
    }

    /// Fingerprint every file; results stay in scan order.
    fn hash_all(&mut self, files: Vec<FileRecord>) -> Vec<(FileRecord, Result<Fingerprint, HashError>)> {
        self.enter(RunPhase::Hashing, files.len());
        let counter = AtomicUsize::new(0);
        let hash_one = |file: FileRecord| {
            let result = if self.is_shutdown_requested() {
                Err(HashError::Io {
                    path: file.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Interrupted, "Shutdown"),
                })
            } else {
                log::debug!("Processing: {}", file.display_name());
                self.hasher.hash(&file.path)
            };
            let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
            self.advance(RunPhase::Hashing, current, &file.path);
            (file, result)
        };

        let results = if self.options.io_threads <= 1 {
            files.into_iter().map(hash_one).collect()
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.io_threads)
                .build()
            {
                // indexed collect keeps input order whatever the completion order
                Ok(pool) => pool.install(|| files.into_par_iter().map(hash_one).collect()),
                Err(e) => {
                    log::warn!("Failed to create hashing pool ({}), hashing sequentially", e);
                    files.into_iter().map(hash_one).collect()
                }
            }
        };
        self.finish(RunPhase::Hashing);
        results
    }

    fn remove_duplicate(&mut self, duplicate: &FileRecord) {
        if self.options.dry_run {
            self.audit.info(format_args!(
                "  Would delete duplicate: {}",
                duplicate.display_name()
            ));
            self.stats.record_removed();
            return;
        }

        self.audit.info(format_args!(
            "  Deleting duplicate: {}",
            duplicate.display_name()
        ));
        match self.relocator.remove(duplicate) {
            Ok(()) => self.stats.record_removed(),
            Err(e) => {
                self.stats.record_error();
                self.audit.error(format_args!(
                    "  Error deleting {}: {}",
                    duplicate.display_name(),
                    e
                ));
            }
        }
    }

    fn relocate_kept(&mut self, file: &FileRecord) {
        if self.options.dry_run {
            let target = self.relocator.resolve_destination(file.file_name());
            self.audit.info(format_args!(
                "Would move: {} -> {}",
                file.display_name(),
                target.display()
            ));
            return;
        }

        match self.relocator.relocate(file) {
            Ok(target) => self.audit.info(format_args!(
                "Moving: {} -> {}",
                file.display_name(),
                target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            )),
            Err(e) => {
                self.stats.record_error();
                self.audit.error(format_args!(
                    "Error moving {}: {}",
                    file.display_name(),
                    e
                ));
            }
        }
    }

    fn report(&mut self) {
        self.enter(RunPhase::Reporting, 0);
        let stats = self.stats;
        self.audit.info("=".repeat(60));
        self.audit.info("Process Summary");
        self.audit.info("=".repeat(60));
        self.audit
            .info(format_args!("Total PDFs processed: {}", stats.total_scanned));
        self.audit
            .info(format_args!("Unique PDFs: {}", stats.unique_count));
        self.audit
            .info(format_args!("Duplicates found: {}", stats.duplicate_count));
        self.audit
            .info(format_args!("Duplicates removed: {}", stats.removed_count));
        self.audit
            .info(format_args!("Errors encountered: {}", stats.error_count));
        self.audit.info(format_args!(
            "Final folder: {}",
            self.options.dest_dir.display()
        ));
        self.audit.info("=".repeat(60));
        log::debug!("{}", stats.summary());
        self.finish(RunPhase::Reporting);
    }

    fn enter(&mut self, phase: RunPhase, total: usize) {
        log::debug!("Run phase: {} -> {}", self.phase, phase);
        self.phase = phase;
        self.emit(ProgressEvent::PhaseStarted { phase, total });
    }

    fn finish(&self, phase: RunPhase) {
        self.emit(ProgressEvent::PhaseFinished { phase });
    }

    fn advance(&self, phase: RunPhase, current: usize, path: &std::path::Path) {
        self.emit(ProgressEvent::Advanced {
            phase,
            current,
            path: path.to_path_buf(),
        });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback.on_event(&event);
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Cooperative cancellation point between two file operations.
    fn checkpoint(&self) -> Result<(), RunError> {
        if self.is_shutdown_requested() {
            log::info!("Shutdown requested during {}", self.phase);
            return Err(RunError::Interrupted { stats: self.stats });
        }
        Ok(())
    }
}
