//! Command-line interface definitions for pdfdedupe.
//!
//! Global options (verbosity, color, config file) plus three subcommands:
//!
//! ```bash
//! # Deduplicate ./source_pdfs into ./final_pdfs (config defaults)
//! pdfdedupe run
//!
//! # Explicit folders, preview only, JSON summary
//! pdfdedupe run --source inbox --dest archive --dry-run --output json
//!
//! # Content fingerprints of a few files
//! pdfdedupe fingerprint a.pdf b.pdf
//!
//! # Page-by-page text comparison
//! pdfdedupe compare a.pdf b.pdf
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find byte-identical PDF duplicates and keep one copy of each.
///
/// Every PDF in the source folder is fingerprinted with SHA-256. Of each
/// group of identical files, the one with the smallest file name is kept;
/// the others are removed and every kept file is moved to the destination
/// folder.
#[derive(Debug, Parser)]
#[command(name = "pdfdedupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (TOML); defaults to the platform config folder
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print errors as a JSON object on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove duplicate PDFs and move the kept files to the destination
    Run(RunArgs),
    /// Print fingerprints of PDF files
    Fingerprint(FingerprintArgs),
    /// Compare the extracted text of two PDFs page by page
    Compare(CompareArgs),
}

/// Arguments for the run subcommand.
///
/// Unset options fall back to the configuration file and environment.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Folder holding the PDFs to deduplicate
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Folder receiving the kept files (created if absent)
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Folder for the audit log file
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write an audit log file
    #[arg(long)]
    pub no_audit_log: bool,

    /// Number of threads used for hashing (1 hashes sequentially)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Move duplicates to the system trash instead of deleting them
    #[arg(long)]
    pub trash: bool,

    /// Report what would happen without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the fingerprint subcommand.
#[derive(Debug, Args)]
pub struct FingerprintArgs {
    /// Fingerprint extracted text and metadata instead of raw bytes
    #[arg(long)]
    pub text: bool,

    /// Files to fingerprint
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    #[arg(value_name = "FIRST")]
    pub first: PathBuf,

    #[arg(value_name = "SECOND")]
    pub second: PathBuf,
}

/// Output format for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
