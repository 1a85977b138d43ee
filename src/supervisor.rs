//! Single-flight execution of detection runs.
//!
//! A run mutates its source and destination folders, so two runs over the
//! same pair would race on every delete and move. [`RunSupervisor`] starts
//! runs on a background thread and refuses a second one while the first is
//! still active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::duplicates::{DetectionRun, RunError, RunStats};
use crate::signal::ShutdownHandler;

/// Why a run could not be started.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("A detection run is already in progress")]
    Busy,

    #[error("Failed to spawn run thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Starts at most one [`DetectionRun`] at a time.
#[derive(Debug, Clone, Default)]
pub struct RunSupervisor {
    active: Arc<AtomicBool>,
}

/// Clears the active flag when the run thread ends, panics included.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RunSupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is currently executing.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start `run` on a background thread.
    ///
    /// The run is given a fresh shutdown flag, reachable through
    /// [`RunHandle::cancel`]; any flag attached earlier is replaced.
    ///
    /// # Errors
    ///
    /// [`SupervisorError::Busy`] while another run is active, or
    /// [`SupervisorError::Spawn`] if the thread cannot be created.
    pub fn start(&self, run: DetectionRun) -> Result<RunHandle, SupervisorError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Rejected run: another run is in progress");
            return Err(SupervisorError::Busy);
        }
        let guard = ActiveGuard(Arc::clone(&self.active));

        let shutdown = ShutdownHandler::new();
        let run = run.with_shutdown_flag(shutdown.get_flag());
        let thread = thread::Builder::new()
            .name("pdfdedupe-run".to_string())
            .spawn(move || {
                let _guard = guard;
                run.run()
            })?;

        Ok(RunHandle { thread, shutdown })
    }
}

/// Handle to a run started by [`RunSupervisor::start`].
#[derive(Debug)]
pub struct RunHandle {
    thread: JoinHandle<Result<RunStats, RunError>>,
    shutdown: ShutdownHandler,
}

impl RunHandle {
    /// Ask the run to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.shutdown.request_shutdown();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the run to end.
    ///
    /// # Panics
    ///
    /// Resumes the panic if the run thread panicked.
    pub fn join(self) -> Result<RunStats, RunError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}
