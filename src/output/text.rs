//! Human-readable run summary.

use std::io::{self, Write};
use std::path::Path;

use yansi::Paint;

use crate::duplicates::{RunOptions, RunStats};

/// Print the end-of-run summary block.
///
/// # Errors
///
/// Returns the I/O error if writing fails.
pub fn write_summary<W: Write>(
    writer: &mut W,
    stats: &RunStats,
    options: &RunOptions,
    audit_log: Option<&Path>,
) -> io::Result<()> {
    let title = if options.dry_run {
        "Dry run summary (no files were changed)"
    } else {
        "Run summary"
    };
    writeln!(writer, "{}", title.bold())?;
    writeln!(writer, "  PDFs scanned:       {}", stats.total_scanned)?;
    writeln!(writer, "  Unique:             {}", stats.unique_count.green())?;
    writeln!(writer, "  Duplicates found:   {}", stats.duplicate_count.yellow())?;
    writeln!(writer, "  Duplicates removed: {}", stats.removed_count)?;
    if stats.has_errors() {
        writeln!(writer, "  Errors:             {}", stats.error_count.red().bold())?;
    } else {
        writeln!(writer, "  Errors:             {}", stats.error_count)?;
    }
    writeln!(writer, "  Final folder:       {}", options.dest_dir.display())?;
    if let Some(path) = audit_log {
        writeln!(writer, "  Audit log:          {}", path.display().dim())?;
    }
    Ok(())
}
