// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// paths = ["src", "Cargo.toml"]
/// debounce_ms = 50
/// settle_ms = 500
///
/// [env]
/// mode = "localhost"
/// ```
///
/// All sections are optional; CLI flags override anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub env: EnvSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Watch targets used when no `-w` is given on the command line.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Debounce quiet period in milliseconds.
    #[serde(default)]
    pub debounce_ms: Option<u64>,

    /// Settling delay in milliseconds.
    #[serde(default)]
    pub settle_ms: Option<u64>,
}

/// `[env]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvSection {
    /// Deployment context selecting `.env.<mode>` files.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub env: EnvSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, env: EnvSection) -> Self {
        Self { watch, env }
    }
}
