//! Scanner module for source folder enumeration and file fingerprinting.
//!
//! This module provides functionality for:
//! - Listing the PDF files of a source folder
//! - Content hashing with SHA-256
//! - Optional text fingerprints of PDF documents
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: PDF discovery in a single folder
//! - [`hasher`]: SHA-256 file hashing (streaming)
//! - [`document`]: page text extraction, text fingerprints and page comparison
//!
//! # Example
//!
//! ```no_run
//! use pdfdedupe::scanner::{scan_pdfs, ContentHasher};
//! use std::path::Path;
//!
//! let hasher = ContentHasher::new();
//! for record in scan_pdfs(Path::new("source_pdfs")).unwrap() {
//!     match hasher.hash(&record.path) {
//!         Ok(fp) => println!("{}  {}", fp, record.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod document;
pub mod hasher;
pub mod walker;

use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use document::{compare_pages, DocumentError, TextFingerprint, TextFingerprinter};
pub use hasher::{ContentHasher, Fingerprint};
pub use walker::{is_pdf, scan_pdfs};

/// Snapshot of a discovered PDF file, taken at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }

    /// Base name of the file, or an empty name for a path without one.
    #[must_use]
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }

    /// File name as raw bytes, the key for deterministic ordering.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        self.file_name().as_encoded_bytes()
    }

    /// Lossy display form of the file name for log lines.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.file_name().to_string_lossy().into_owned()
    }

    /// Compare two records by file name bytes, then by full path.
    #[must_use]
    pub fn cmp_by_name(&self, other: &Self) -> std::cmp::Ordering {
        self.name_bytes()
            .cmp(other.name_bytes())
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Errors that make the source folder unusable. Fatal to a run.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when listing the folder.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while listing the folder.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
