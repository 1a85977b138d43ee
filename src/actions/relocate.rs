//! Duplicate removal and collision-safe relocation.
//!
//! # Overview
//!
//! [`Relocator`] owns one destination folder and performs the two
//! filesystem mutations of a run:
//! - [`Relocator::remove`] deletes a redundant copy (permanently, or to the
//!   system trash with [`RemovalMode::Trash`])
//! - [`Relocator::relocate`] moves a kept file into the destination,
//!   renaming it `stem_1.ext`, `stem_2.ext`, … when the name is taken
//!
//! Name resolution and the move happen under one lock per relocator, so two
//! calls on the same instance never race for the same destination name.
//! Other processes writing into the destination are not guarded against.
//!
//! # Example
//!
//! ```no_run
//! use pdfdedupe::actions::Relocator;
//! use pdfdedupe::scanner::scan_pdfs;
//! use std::path::Path;
//!
//! let relocator = Relocator::new("final_pdfs");
//! relocator.ensure_destination().unwrap();
//! for record in scan_pdfs(Path::new("source_pdfs")).unwrap() {
//!     match relocator.relocate(&record) {
//!         Ok(target) => println!("Moved to {}", target.display()),
//!         Err(e) => eprintln!("Failed: {}", e),
//!     }
//! }
//! ```

use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::FileRecord;

/// How redundant copies are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Delete the file for good.
    #[default]
    Permanent,
    /// Move the file to the system trash (recoverable).
    Trash,
}

/// Error type for removal and relocation.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// File was not found (already deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied on the file or its folder.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocateError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Build `stem_<counter>.ext` from a file name.
///
/// A name without extension gets the suffix appended at the end.
#[must_use]
pub fn suffixed_name(name: &OsStr, counter: u32) -> OsString {
    let path = Path::new(name);
    let mut result = path.file_stem().unwrap_or(name).to_os_string();
    result.push(format!("_{counter}"));
    if let Some(ext) = path.extension() {
        result.push(".");
        result.push(ext);
    }
    result
}

/// Moves files into one destination folder and removes duplicates.
#[derive(Debug)]
pub struct Relocator {
    destination: PathBuf,
    removal: RemovalMode,
    lock: Mutex<()>,
}

impl Relocator {
    /// Create a relocator targeting `destination`.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            removal: RemovalMode::Permanent,
            lock: Mutex::new(()),
        }
    }

    /// Set how duplicates are removed.
    #[must_use]
    pub fn with_removal_mode(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }

    /// The destination folder.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Create the destination folder (and parents) if absent.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the folder cannot be created.
    pub fn ensure_destination(&self) -> io::Result<()> {
        fs::create_dir_all(&self.destination)
    }

    /// Delete `file.path`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file is already gone
    /// - `PermissionDenied` if deletion is not allowed
    /// - `TrashFailed` if the trash operation fails
    pub fn remove(&self, file: &FileRecord) -> Result<(), RelocateError> {
        let path = file.path.as_path();
        match self.removal {
            RemovalMode::Permanent => {
                fs::remove_file(path).map_err(|e| RelocateError::from_io(path, e))?;
                log::debug!("Permanently deleted: {}", path.display());
            }
            RemovalMode::Trash => {
                fs::symlink_metadata(path).map_err(|e| RelocateError::from_io(path, e))?;
                trash::delete(path).map_err(|e| RelocateError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                log::debug!("Moved to trash: {}", path.display());
            }
        }
        Ok(())
    }

    /// Move `file` into the destination folder and return its final path.
    ///
    /// The base name is kept unless taken, in which case the first free
    /// `stem_N.ext` is used. An existing file is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`RelocateError`] if the source is gone or the move fails;
    /// the source is left in place in that case.
    pub fn relocate(&self, file: &FileRecord) -> Result<PathBuf, RelocateError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let target = self.resolve_destination(file.file_name());
        move_file(&file.path, &target)?;
        log::debug!("Moved {} -> {}", file.path.display(), target.display());
        Ok(target)
    }

    /// First unused path in the destination for `name`.
    ///
    /// Only reflects the folder's current contents; callers that need the
    /// answer to stay valid must hold the relocator's lock, as
    /// [`Relocator::relocate`] does.
    #[must_use]
    pub fn resolve_destination(&self, name: &OsStr) -> PathBuf {
        let mut candidate = self.destination.join(name);
        let mut counter = 1;
        while name_taken(&candidate) {
            candidate = self.destination.join(suffixed_name(name, counter));
            counter += 1;
        }
        candidate
    }
}

/// A dangling symlink still occupies its name.
fn name_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn move_file(source: &Path, target: &Path) -> Result<(), RelocateError> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RelocateError::NotFound(source.to_path_buf())),
        Err(e) => {
            log::debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                source.display(),
                target.display(),
                e
            );
            copy_then_remove(source, target)
        }
    }
}

/// Copy into a freshly created target, then drop the source.
///
/// If the source cannot be removed the copy is deleted again so the file
/// exists in exactly one place.
fn copy_then_remove(source: &Path, target: &Path) -> Result<(), RelocateError> {
    let mut input = File::open(source).map_err(|e| RelocateError::from_io(source, e))?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| RelocateError::from_io(target, e))?;

    let copied = io::copy(&mut input, &mut output).and_then(|_| output.sync_all());
    drop(output);
    if let Err(e) = copied {
        let _ = fs::remove_file(target);
        return Err(RelocateError::from_io(target, e));
    }

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(target);
        return Err(RelocateError::from_io(source, e));
    }
    Ok(())
}
