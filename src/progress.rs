//! Progress reporting for detection runs.
//!
//! A run pushes [`ProgressEvent`]s into a caller-supplied
//! [`ProgressCallback`]. Three sinks ship with the crate:
//!
//! - [`Progress`]: indicatif progress bars for the CLI
//! - [`StatusTracker`]: folds events into a [`StatusSnapshot`] that a
//!   polling front end can read at any time
//! - `std::sync::mpsc::Sender<ProgressEvent>`: forwards every event to a
//!   channel owned by the caller

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::duplicates::{RunPhase, RunStats};
use crate::scanner::Fingerprint;

/// One step of a run, as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A phase began; `total` is the number of items it will process.
    PhaseStarted { phase: RunPhase, total: usize },
    /// An item of the current phase was processed (1-based).
    Advanced {
        phase: RunPhase,
        current: usize,
        path: PathBuf,
    },
    /// A phase finished.
    PhaseFinished { phase: RunPhase },
    /// A duplicate group is about to be reconciled.
    GroupFound {
        fingerprint: Fingerprint,
        members: usize,
    },
    /// The run completed (possibly with per-file errors).
    Completed { stats: RunStats },
    /// The run stopped before completing.
    Failed { reason: String },
}

/// Receiver of progress events.
///
/// Implementations are called from the thread executing the run and, while
/// hashing in parallel, from pool threads.
pub trait ProgressCallback: Send + Sync {
    /// Called for every event of the run, in order per thread.
    fn on_event(&self, event: &ProgressEvent);
}

impl ProgressCallback for Sender<ProgressEvent> {
    fn on_event(&self, event: &ProgressEvent) {
        // a dropped receiver just means nobody is listening any more
        let _ = self.send(event.clone());
    }
}

/// Point-in-time view of a run for polling clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// A run is in progress
    pub is_processing: bool,
    /// Rough completion percentage (0-100)
    pub progress: u8,
    /// Human-readable status line
    pub status: String,
    /// Final counters once the run completed
    pub stats: Option<RunStats>,
    /// Failure reason if the run did not complete
    pub error: Option<String>,
}

/// Keeps a [`StatusSnapshot`] current from the event stream.
#[derive(Debug, Default)]
pub struct StatusTracker {
    snapshot: Mutex<StatusSnapshot>,
    phase_total: Mutex<usize>,
}

impl StatusTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current status.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, apply: impl FnOnce(&mut StatusSnapshot)) {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut snapshot);
    }
}

/// Percentage band each phase occupies.
fn phase_band(phase: RunPhase) -> (u8, u8) {
    match phase {
        RunPhase::Idle => (0, 0),
        RunPhase::Scanning => (0, 10),
        RunPhase::Hashing => (10, 50),
        RunPhase::Grouping => (50, 60),
        RunPhase::Reconciling => (60, 95),
        RunPhase::Reporting => (95, 99),
        RunPhase::Done | RunPhase::Failed | RunPhase::Interrupted => (100, 100),
    }
}

fn phase_status(phase: RunPhase) -> &'static str {
    match phase {
        RunPhase::Idle => "Idle",
        RunPhase::Scanning => "Scanning for PDFs...",
        RunPhase::Hashing => "Fingerprinting PDFs...",
        RunPhase::Grouping => "Grouping duplicates...",
        RunPhase::Reconciling => "Processing duplicates...",
        RunPhase::Reporting => "Finalizing...",
        RunPhase::Done => "Completed!",
        RunPhase::Failed => "Failed",
        RunPhase::Interrupted => "Interrupted",
    }
}

impl ProgressCallback for StatusTracker {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PhaseStarted { phase, total } => {
                *self.phase_total.lock().unwrap_or_else(PoisonError::into_inner) = *total;
                let (start, _) = phase_band(*phase);
                self.update(|s| {
                    s.is_processing = true;
                    s.progress = start;
                    s.status = phase_status(*phase).to_string();
                    s.stats = None;
                    s.error = None;
                });
            }
            ProgressEvent::Advanced { phase, current, .. } => {
                let total = *self.phase_total.lock().unwrap_or_else(PoisonError::into_inner);
                let (start, end) = phase_band(*phase);
                let span = usize::from(end - start);
                let done = if total == 0 {
                    0
                } else {
                    span * (*current).min(total) / total
                };
                // done <= span <= 100
                let pct = start + u8::try_from(done).unwrap_or(end - start);
                self.update(|s| s.progress = s.progress.max(pct));
            }
            ProgressEvent::PhaseFinished { phase } => {
                let (_, end) = phase_band(*phase);
                self.update(|s| s.progress = s.progress.max(end));
            }
            ProgressEvent::GroupFound { .. } => {}
            ProgressEvent::Completed { stats } => self.update(|s| {
                s.is_processing = false;
                s.progress = 100;
                s.status = phase_status(RunPhase::Done).to_string();
                s.stats = Some(*stats);
            }),
            ProgressEvent::Failed { reason } => self.update(|s| {
                s.is_processing = false;
                s.status = format!("Error: {reason}");
                s.error = Some(reason.clone());
            }),
        }
    }
}

/// Progress reporter using indicatif.
///
/// Shows a spinner while scanning and a bar for hashing and reconciling.
pub struct Progress {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            current: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn start_phase(&self, phase: RunPhase, total: usize) {
        let pb = match phase {
            RunPhase::Hashing | RunPhase::Reconciling => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        pb.set_message(phase_status(phase));
        if let Some(previous) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn finish_phase(&self, phase: RunPhase) {
        if let Some(pb) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_with_message(format!("{phase} complete"));
        }
    }
}

impl ProgressCallback for Progress {
    fn on_event(&self, event: &ProgressEvent) {
        if self.quiet {
            return;
        }
        match event {
            ProgressEvent::PhaseStarted { phase, total } => self.start_phase(*phase, *total),
            ProgressEvent::Advanced { current, path, .. } => {
                if let Some(ref pb) = *self.current.lock().unwrap_or_else(PoisonError::into_inner) {
                    pb.set_position(*current as u64);
                    pb.set_message(truncate_path(path, 30));
                }
            }
            ProgressEvent::PhaseFinished { phase } => self.finish_phase(*phase),
            ProgressEvent::GroupFound { .. } => {}
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. } => {
                if let Some(pb) = self
                    .current
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take()
                {
                    pb.finish_and_clear();
                }
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &Path, max_len: usize) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let chars: Vec<char> = file_name.chars().collect();
    if chars.len() <= max_len {
        return file_name;
    }
    let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
    format!("...{tail}")
}
