//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file: `--config FILE`, else `config.toml` in the platform config
//!    folder when it exists
//! 3. Environment variables prefixed `PDFDEDUPE_` (`PDFDEDUPE_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::apply_run_args`])

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::actions::RemovalMode;
use crate::cli::RunArgs;
use crate::duplicates::RunOptions;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "PDFDEDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding the PDFs to deduplicate
    pub source_dir: PathBuf,
    /// Folder receiving the kept files
    pub final_dir: PathBuf,
    /// Folder for audit log files
    pub log_dir: PathBuf,
    /// Threads used for hashing
    pub io_threads: usize,
    /// How duplicates are removed
    pub removal: RemovalMode,
    /// Whether a run writes an audit log file
    pub audit_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source_pdfs"),
            final_dir: PathBuf::from("final_pdfs"),
            log_dir: PathBuf::from("logs"),
            io_threads: 4,
            removal: RemovalMode::Permanent,
            audit_log: true,
        }
    }
}

impl Config {
    /// Load defaults, config file and environment.
    ///
    /// An explicit `path` must exist; the platform default is optional.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing or any layer holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(explicit) => {
                if !explicit.is_file() {
                    bail!("Config file not found: {}", explicit.display());
                }
                Some(explicit.to_path_buf())
            }
            None => Self::default_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        Self::extract(figment)
    }

    /// Load defaults overlaid with a single TOML file, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Fails if the file holds invalid TOML or invalid values.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(path)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let mut config: Self = figment
            .extract()
            .context("Invalid configuration")?;
        config.io_threads = config.io_threads.max(1);
        Ok(config)
    }

    /// `config.toml` in the platform configuration folder.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "pdfdedupe", "pdfdedupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay the flags given on the command line.
    pub fn apply_run_args(&mut self, args: &RunArgs) {
        if let Some(ref source) = args.source {
            self.source_dir.clone_from(source);
        }
        if let Some(ref dest) = args.dest {
            self.final_dir.clone_from(dest);
        }
        if let Some(ref log_dir) = args.log_dir {
            self.log_dir.clone_from(log_dir);
        }
        if let Some(threads) = args.io_threads {
            self.io_threads = usize::from(threads).max(1);
        }
        if args.trash {
            self.removal = RemovalMode::Trash;
        }
        if args.no_audit_log {
            self.audit_log = false;
        }
    }

    /// Options for one detection run.
    #[must_use]
    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        RunOptions::new(&self.source_dir, &self.final_dir)
            .with_io_threads(self.io_threads)
            .with_removal_mode(self.removal)
            .with_dry_run(dry_run)
    }
}
