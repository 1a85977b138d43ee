//! pdfdedupe - duplicate PDF detection
//!
//! Finds byte-identical PDFs in a source folder by SHA-256 fingerprint,
//! keeps the copy with the smallest file name from each group, removes the
//! others and moves every kept file into a destination folder without ever
//! overwriting what is already there.

pub mod actions;
pub mod audit;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod supervisor;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::audit::AuditLog;
use crate::cli::{Cli, Commands, CompareArgs, FingerprintArgs, OutputFormat, RunArgs};
use crate::config::Config;
use crate::duplicates::DetectionRun;
use crate::error::ExitCode;
use crate::output::JsonReport;
use crate::progress::Progress;
use crate::scanner::{compare_pages, ContentHasher, TextFingerprinter};

/// Execute the parsed command line and report the exit code.
///
/// # Errors
///
/// Returns an error for failures that end a command outright: unreadable
/// configuration, unusable source folder, interrupted run, unreadable
/// input file.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let quiet = cli.quiet;
    match cli.command {
        Commands::Run(ref args) => handle_run(cli.config.as_deref(), args, quiet),
        Commands::Fingerprint(ref args) => handle_fingerprint(args),
        Commands::Compare(ref args) => handle_compare(args),
    }
}

fn handle_run(config_path: Option<&std::path::Path>, args: &RunArgs, quiet: bool) -> Result<ExitCode> {
    let mut config = Config::load(config_path)?;
    config.apply_run_args(args);
    log::debug!("Effective configuration: {:?}", config);

    let options = config.run_options(args.dry_run);
    let audit = if config.audit_log {
        AuditLog::create_in(&config.log_dir).with_context(|| {
            format!("Failed to create audit log in {}", config.log_dir.display())
        })?
    } else {
        AuditLog::disabled()
    };
    let audit = Arc::new(audit);

    let shutdown = signal::install_handler()?;
    let progress = Arc::new(Progress::new(quiet || args.output == OutputFormat::Json));

    let stats = DetectionRun::new(options.clone())
        .with_audit_log(Arc::clone(&audit))
        .with_progress_callback(progress)
        .with_shutdown_flag(shutdown.get_flag())
        .run()?;

    let exit_code = ExitCode::from_stats(&stats);
    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Json => {
            JsonReport::new(stats, &options, audit.path(), exit_code).write_to(&mut stdout, true)?;
        }
        OutputFormat::Text => {
            if !quiet {
                output::write_summary(&mut stdout, &stats, &options, audit.path())?;
            }
        }
    }
    Ok(exit_code)
}

fn handle_fingerprint(args: &FingerprintArgs) -> Result<ExitCode> {
    let hasher = ContentHasher::new();
    let mut stdout = io::stdout().lock();
    let mut code = ExitCode::Success;

    for path in &args.files {
        let line = if args.text {
            TextFingerprinter::fingerprint(path).map(|fp| {
                if fp.is_approximate() {
                    log::warn!(
                        "{}: {} of {} page(s) unreadable, fingerprint is approximate",
                        path.display(),
                        fp.skipped_pages,
                        fp.pages
                    );
                }
                fp.fingerprint
            })
            .map_err(anyhow::Error::from)
        } else {
            hasher.hash(path).map_err(anyhow::Error::from)
        };

        match line {
            Ok(fingerprint) => writeln!(stdout, "{}  {}", fingerprint, path.display())?,
            Err(e) => {
                log::error!("{}", e);
                code = ExitCode::PartialSuccess;
            }
        }
    }
    Ok(code)
}

fn handle_compare(args: &CompareArgs) -> Result<ExitCode> {
    let identical = compare_pages(&args.first, &args.second)?;
    let verdict = if identical { "identical" } else { "different" };
    println!(
        "{} and {}: {}",
        args.first.display(),
        args.second.display(),
        verdict
    );
    Ok(if identical {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}
