//! PDF discovery in a single source folder.
//!
//! # Overview
//!
//! The source folder is listed one level deep (no recursion) with
//! [`walkdir`]. Only regular files whose extension is `pdf` in any case are
//! kept. The result is sorted by file name bytes so every later phase sees
//! the same order regardless of how the OS iterates the directory.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

use super::{FileRecord, ScanError};

/// Check whether a path has a `.pdf` extension (case-insensitive).
#[must_use]
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// List the PDF files directly inside `dir`.
///
/// Paths in the returned records are absolute. Entries that vanish or
/// cannot be stat'ed after listing are still returned (with zero size) so
/// the hashing phase records them as per-file errors.
///
/// # Errors
///
/// Returns [`ScanError`] if `dir` does not exist, is not a directory, or
/// cannot be listed.
pub fn scan_pdfs(dir: &Path) -> Result<Vec<FileRecord>, ScanError> {
    let metadata = fs::metadata(dir).map_err(|e| ScanError::from_io(dir, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    let root = fs::canonicalize(dir).map_err(|e| ScanError::from_io(dir, e))?;

    let mut records = Vec::new();
    for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // depth 0 means the folder itself could not be read
                if err.depth() == 0 {
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(ScanError::from_io(&root, source));
                }
                log::warn!("Skipping unreadable entry in {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_pdf(entry.path()) {
            log::trace!("Ignoring non-PDF entry: {}", entry.path().display());
            continue;
        }

        let (size, modified) = match entry.metadata() {
            Ok(meta) => (
                meta.len(),
                meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            ),
            Err(err) => {
                log::warn!("Cannot stat {}: {}", entry.path().display(), err);
                (0, SystemTime::UNIX_EPOCH)
            }
        };
        records.push(FileRecord::new(entry.into_path(), size, modified));
    }

    records.sort_by(FileRecord::cmp_by_name);
    log::debug!("Found {} PDF files in {}", records.len(), root.display());
    Ok(records)
}
