//! PDF text extraction, text fingerprints and page comparison.
//!
//! This module is the secondary, content-semantic path. It is never used to
//! decide which files are duplicates during a run; it exists for callers who
//! want to confirm that two documents carry the same text.
//!
//! - [`TextFingerprinter::fingerprint`] hashes the text of every page plus
//!   the document information dictionary.
//! - [`compare_pages`] checks two documents page by page.
//!
//! Pages whose text cannot be extracted are skipped, not fatal. Only a
//! container that cannot be parsed at all fails the call.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object};
use thiserror::Error;

use super::Fingerprint;

/// Errors that can occur during document text extraction.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The PDF container could not be parsed.
    #[error("Failed to parse PDF {path}: {message}")]
    Parse {
        /// Path to the PDF file
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

/// Result of fingerprinting a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFingerprint {
    /// SHA-256 over page text followed by serialized metadata
    pub fingerprint: Fingerprint,
    /// Number of pages in the document
    pub pages: usize,
    /// Pages whose text could not be extracted and were left out
    pub skipped_pages: usize,
}

impl TextFingerprint {
    /// Whether some pages were skipped while building the fingerprint.
    ///
    /// Such fingerprints are still usable as equality keys, but two
    /// documents that differ only on a skipped page will compare equal.
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        self.skipped_pages > 0
    }
}

/// Fingerprinter over extracted text and metadata.
pub struct TextFingerprinter;

impl TextFingerprinter {
    /// Fingerprint the text content of the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] if the file cannot be read and
    /// [`DocumentError::Parse`] if the container is malformed.
    pub fn fingerprint(path: &Path) -> Result<TextFingerprint, DocumentError> {
        let doc = load_document(path)?;
        let pages = extract_pages(&doc, path);

        let mut text = String::new();
        let mut skipped_pages = 0;
        for page in &pages {
            match page {
                Some(page_text) => text.push_str(page_text),
                None => skipped_pages += 1,
            }
        }
        text.push_str(&metadata_text(&doc));

        if skipped_pages > 0 {
            log::warn!(
                "Text fingerprint of {} skipped {} of {} pages",
                path.display(),
                skipped_pages,
                pages.len()
            );
        }

        Ok(TextFingerprint {
            fingerprint: Fingerprint::of_bytes(text.as_bytes()),
            pages: pages.len(),
            skipped_pages,
        })
    }
}

/// Compare two PDFs page by page.
///
/// Returns `false` when the page counts differ, when any page text differs,
/// or when a page cannot be extracted from either document.
///
/// # Errors
///
/// Returns [`DocumentError`] if either document cannot be read or parsed.
pub fn compare_pages(first: &Path, second: &Path) -> Result<bool, DocumentError> {
    let doc_a = load_document(first)?;
    let doc_b = load_document(second)?;

    let pages_a = extract_pages(&doc_a, first);
    let pages_b = extract_pages(&doc_b, second);
    if pages_a.len() != pages_b.len() {
        log::debug!(
            "Page count differs: {} has {}, {} has {}",
            first.display(),
            pages_a.len(),
            second.display(),
            pages_b.len()
        );
        return Ok(false);
    }

    for (index, (a, b)) in pages_a.iter().zip(&pages_b).enumerate() {
        match (a, b) {
            (Some(a), Some(b)) if a == b => {}
            (Some(_), Some(_)) => {
                log::debug!("Page {} text differs", index + 1);
                return Ok(false);
            }
            _ => {
                log::warn!("Page {} could not be extracted, treating as different", index + 1);
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let bytes = fs::read(path).map_err(|e| DocumentError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Document::load_mem(&bytes).map_err(|e| DocumentError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Extract the text of every page in page order; `None` for failed pages.
fn extract_pages(doc: &Document, path: &Path) -> Vec<Option<String>> {
    doc.get_pages()
        .keys()
        .map(|&number| match doc.extract_text(&[number]) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!(
                    "Error extracting text from page {} in {}: {}",
                    number,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}

/// Serialize the document information dictionary as sorted `Key=Value` lines.
fn metadata_text(doc: &Document) -> String {
    let dict = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    let Some(dict) = dict else {
        return String::new();
    };

    let mut entries: Vec<(String, String)> = dict
        .iter()
        .map(|(key, value)| (String::from_utf8_lossy(key).into_owned(), object_text(value)))
        .collect();
    entries.sort();

    entries
        .into_iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

fn object_text(object: &Object) -> String {
    match object {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Reference((num, generation)) => format!("{num} {generation} R"),
        _ => String::new(),
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise byte-per-char.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
