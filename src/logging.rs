// src/logging.rs

//! Logging setup for `as-soon` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` (applies to every target)
//! 2. `AS_SOON_LOG`, either a bare level ("debug") or full directives
//!    ("as_soon::watch=trace,info")
//! 3. `info`
//!
//! Everything goes to stderr; stdout belongs to the watched command.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "AS_SOON_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// Resolve the filter from the CLI flag and the raw `AS_SOON_LOG` value.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level_from_log_level(level).as_str()));
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_level_str(raw) {
            Some(level) => Ok(EnvFilter::new(level.as_str())),
            None => EnvFilter::try_new(raw).with_context(|| format!("invalid {LOG_ENV_VAR} value `{raw}`")),
        },
        None => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_beats_environment() {
        let filter = build_filter(Some(LogLevel::Warn), Some("trace")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn environment_accepts_levels_and_directives() {
        assert_eq!(build_filter(None, Some("DEBUG")).unwrap().to_string(), "debug");
        let directives = build_filter(None, Some("as_soon::watch=trace")).unwrap();
        assert!(directives.to_string().contains("as_soon::watch=trace"));
        assert_eq!(build_filter(None, Some("  ")).unwrap().to_string(), "info");
        assert_eq!(build_filter(None, None).unwrap().to_string(), "info");
    }

    #[test]
    fn garbage_in_environment_is_an_error() {
        assert!(build_filter(None, Some("as_soon=[[[")).is_err());
    }
}
