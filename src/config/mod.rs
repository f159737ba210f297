// src/config/mod.rs

//! Configuration loading and validation for as-soon.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate timing bounds and names (`validate.rs`).
//! - Merge CLI flags over the file over built-in defaults ([`Settings`]).

pub mod loader;
pub mod model;
pub mod validate;

use std::time::Duration;

use tracing::debug;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, EnvSection, RawConfigFile, WatchSection};

use crate::cli::CliArgs;
use crate::engine::{DEFAULT_DEBOUNCE, DEFAULT_SETTLE};
use crate::env::DEFAULT_MODE;
use crate::errors::Result;

/// Effective settings after merging every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Watch targets to use when none were given with `-w`.
    pub default_targets: Vec<String>,
    pub debounce: Duration,
    pub settle: Duration,
    pub mode: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_targets: vec![".".to_string()],
            debounce: DEFAULT_DEBOUNCE,
            settle: DEFAULT_SETTLE,
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

impl Settings {
    /// Load `--config` (if given) and apply CLI overrides.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                debug!(path = %path, "loading config file");
                load_and_validate(path)?
            }
            None => ConfigFile::default(),
        };
        Self::merge(args, &file)
    }

    /// CLI > config file > defaults.
    pub fn merge(args: &CliArgs, file: &ConfigFile) -> Result<Self> {
        validate::validate_delay("--debounce-ms", args.debounce_ms)?;
        validate::validate_delay("--settle-ms", args.settle_ms)?;
        if let Some(mode) = &args.mode {
            validate::validate_mode(mode)?;
        }

        let defaults = Settings::default();

        let default_targets = if file.watch.paths.is_empty() {
            defaults.default_targets
        } else {
            file.watch.paths.clone()
        };

        let debounce = args
            .debounce_ms
            .or(file.watch.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);

        let settle = args
            .settle_ms
            .or(file.watch.settle_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.settle);

        let mode = args
            .mode
            .clone()
            .or_else(|| file.env.mode.clone())
            .unwrap_or(defaults.mode);

        Ok(Self {
            default_targets,
            debounce,
            settle,
            mode,
        })
    }

    /// The watch targets to resolve: the CLI list if any, else the defaults.
    pub fn watch_targets(&self, cli_targets: &[String]) -> Vec<String> {
        if cli_targets.is_empty() {
            self.default_targets.clone()
        } else {
            cli_targets.to_vec()
        }
    }
}
