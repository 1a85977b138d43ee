//! Console logging for pdfdedupe.
//!
//! Library code logs through the `log` facade; the binary installs an
//! `env_logger` backend here. The per-run audit file is separate, see
//! [`crate::audit`].
//!
//! Level resolution, first match wins:
//!
//! 1. `RUST_LOG` environment variable
//! 2. `--quiet`: errors only
//! 3. `--verbose` count: 1 = debug, 2+ = trace
//! 4. info
//!
//! ```rust,no_run
//! use pdfdedupe::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Install the console logger.
///
/// Calling it again is harmless: the first logger stays installed.
///
/// Debug builds prefix lines with a timestamp, and with the module path
/// once `verbose >= 1`. Release builds print level and message only.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").ok();
    let mut builder = Builder::new();

    match from_env {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    let with_module = cfg!(debug_assertions) && verbose >= 1;
    let with_time = cfg!(debug_assertions);
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if with_time {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{style}{level:<5}{style:#} ")?;
        if with_module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping it");
        return;
    }

    match from_env {
        Some(spec) => log::debug!("Logging configured from RUST_LOG={}", spec),
        None => log::debug!("Logging initialized at level: {}", current_level_name()),
    }
}

/// Level implied by the CLI flags; `quiet` beats `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Current maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
