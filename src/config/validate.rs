// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AsSoonError, Result};

/// Upper bound for both timing knobs.
pub const MAX_DELAY_MS: u64 = 60_000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AsSoonError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.env))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_delay("[watch].debounce_ms", cfg.watch.debounce_ms)?;
    validate_delay("[watch].settle_ms", cfg.watch.settle_ms)?;
    validate_paths(&cfg.watch.paths)?;
    if let Some(mode) = &cfg.env.mode {
        validate_mode(mode)?;
    }
    Ok(())
}

pub fn validate_delay(name: &str, value: Option<u64>) -> Result<()> {
    match value {
        Some(ms) if ms > MAX_DELAY_MS => Err(AsSoonError::ConfigError(format!(
            "{name} must be <= {MAX_DELAY_MS} (got {ms})"
        ))),
        _ => Ok(()),
    }
}

fn validate_paths(paths: &[String]) -> Result<()> {
    if paths.iter().any(|p| p.trim().is_empty()) {
        return Err(AsSoonError::ConfigError(
            "[watch].paths must not contain empty entries".to_string(),
        ));
    }
    Ok(())
}

/// A mode ends up in a file name (`.env.<mode>`), so it must be a plain name.
pub fn validate_mode(mode: &str) -> Result<()> {
    if mode.trim().is_empty() {
        return Err(AsSoonError::ConfigError("mode must not be empty".to_string()));
    }
    if mode.contains(['/', '\\']) || mode == "." || mode == ".." {
        return Err(AsSoonError::ConfigError(format!(
            "mode '{mode}' must not contain path separators"
        )));
    }
    Ok(())
}
