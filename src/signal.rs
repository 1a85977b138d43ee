//! Ctrl+C handling for cooperative cancellation.
//!
//! A [`ShutdownHandler`] owns the flag a [`DetectionRun`](crate::duplicates::DetectionRun)
//! polls between file operations. Pressing Ctrl+C sets the flag; the run
//! finishes the delete or move in flight and returns
//! [`RunError::Interrupted`](crate::duplicates::RunError::Interrupted).
//!
//! ```rust,no_run
//! use pdfdedupe::duplicates::{DetectionRun, RunOptions};
//! use pdfdedupe::signal::install_handler;
//!
//! let handler = install_handler().expect("signal handler");
//! let run = DetectionRun::new(RunOptions::new("source_pdfs", "final_pdfs"))
//!     .with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// A handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Ask every holder of the flag to stop at its next checkpoint.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to a run.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear a previous request so the handler can guard another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static INSTALLED: Mutex<Option<ShutdownHandler>> = Mutex::new(None);

/// Register the process-wide Ctrl+C handler.
///
/// The ctrlc hook can only be registered once per process. Later calls
/// (several `run_app` invocations in one test binary, for instance) get the
/// already registered handler back with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another handler owns the
/// signal and none was registered through this function.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handler) = installed.as_ref() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. Finishing the current file...");
        let _ = stderr.flush();
        log::info!("Shutdown signal received");
    })?;

    *installed = Some(handler.clone());
    Ok(handler)
}
