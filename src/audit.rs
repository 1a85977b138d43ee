//! Append-only audit log of a run.
//!
//! The caller decides where lines go and how long the sink lives; a run only
//! appends to it. Each line reads `<timestamp> <LEVEL> <message>` and is also
//! forwarded to the `log` facade so the console shows the same events.
//!
//! ```no_run
//! use pdfdedupe::audit::AuditLog;
//! use std::path::Path;
//!
//! let audit = AuditLog::create_in(Path::new("logs")).unwrap();
//! audit.info("Logging initialized");
//! ```

use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use log::Level;

type Sink = Box<dyn Write + Send>;

/// Line-oriented audit sink shared by one run.
pub struct AuditLog {
    sink: Mutex<Option<Sink>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::disabled()
    }
}

impl AuditLog {
    /// An audit log that only forwards to the `log` facade.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sink: Mutex::new(None),
            path: None,
        }
    }

    /// Write audit lines to any writer owned by the caller.
    #[must_use]
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Mutex::new(Some(Box::new(writer))),
            path: None,
        }
    }

    /// Open `path` in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Mutex::new(Some(Box::new(file))),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create `duplicate_detection_<YYYYmmdd_HHMMSS>.log` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the folder or file cannot be created.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!(
            "duplicate_detection_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let audit = Self::append_to(&dir.join(name))?;
        if let Some(path) = audit.path() {
            audit.info(format_args!("Logging initialized. Log file: {}", path.display()));
        }
        Ok(audit)
    }

    /// Backing file, when the log was opened from a path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record an informational event.
    pub fn info(&self, message: impl Display) {
        self.write(Level::Info, message);
    }

    /// Record a warning.
    pub fn warn(&self, message: impl Display) {
        self.write(Level::Warn, message);
    }

    /// Record a per-file failure.
    pub fn error(&self, message: impl Display) {
        self.write(Level::Error, message);
    }

    fn write(&self, level: Level, message: impl Display) {
        log::log!(level, "{}", message);

        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(writer) = sink.as_mut() else {
            return;
        };
        let line = format!(
            "{} {:<5} {}\n",
            Local::now().format("%Y-%m-%dT%H:%M:%S%:z"),
            level,
            message
        );
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|()| writer.flush()) {
            // a broken sink must never fail the run
            log::debug!("Audit log write failed: {}", e);
        }
    }
}
