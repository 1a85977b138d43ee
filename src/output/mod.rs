//! Output formatters for run results.
//!
//! - Colored text summary for terminals
//! - JSON report for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use pdfdedupe::duplicates::{DetectionRun, RunOptions};
//! use pdfdedupe::error::ExitCode;
//! use pdfdedupe::output::JsonReport;
//!
//! let options = RunOptions::new("source_pdfs", "final_pdfs");
//! let stats = DetectionRun::new(options.clone()).run().unwrap();
//! let report = JsonReport::new(stats, &options, None, ExitCode::from_stats(&stats));
//! report.write_to(&mut std::io::stdout(), true).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutputError, JsonReport};
pub use text::write_summary;
