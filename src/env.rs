// src/env.rs

//! Environment loading for a deployment context ("mode").
//!
//! Files are read from the working directory, lowest precedence first:
//! `.env`, `.env.local`, `.env.<mode>`, `.env.<mode>.local`. Missing files are
//! skipped. Variables already set in the process environment always win; the
//! rest are handed to every spawned command.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{AsSoonError, Result};
use crate::fs::FileSystem;

pub const DEFAULT_MODE: &str = "localhost";

/// Candidate file names for `mode`, lowest precedence first.
pub fn env_files(mode: &str) -> [String; 4] {
    [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{mode}"),
        format!(".env.{mode}.local"),
    ]
}

/// Variables loaded from env files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: BTreeMap<String, String>,
}

impl EnvVars {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Drop every variable for which `is_set` says the process already has a
    /// value.
    pub fn without(mut self, is_set: impl Fn(&str) -> bool) -> Self {
        self.vars.retain(|key, _| !is_set(key));
        self
    }

    /// Drop variables already present in this process's environment.
    pub fn without_process_overrides(self) -> Self {
        self.without(|key| std::env::var_os(key).is_some())
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.vars
    }
}

/// Load and merge the env files for `mode` found in `dir`.
pub fn load_env(fs: &dyn FileSystem, dir: &Path, mode: &str) -> Result<EnvVars> {
    let mut vars = BTreeMap::new();

    for name in env_files(mode) {
        let path = dir.join(&name);
        if !fs.is_file(&path) {
            continue;
        }
        let contents = fs.read_to_string(&path)?;
        let parsed = parse_env_file(&contents)
            .map_err(|(line, msg)| AsSoonError::ConfigError(format!("{name}:{line}: {msg}")))?;
        debug!(file = %name, count = parsed.len(), "loaded env file");
        vars.extend(parsed);
    }

    if !vars.is_empty() {
        info!(mode, count = vars.len(), "loaded environment");
    }
    Ok(EnvVars { vars })
}

/// Parse dotenv-style contents into key/value pairs in file order.
///
/// Errors carry the 1-based line number.
pub fn parse_env_file(contents: &str) -> std::result::Result<Vec<(String, String)>, (usize, String)> {
    let mut out = Vec::new();

    for (idx, raw_line) in contents.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            return Err((lineno, format!("expected KEY=VALUE, got `{line}`")));
        };
        let key = key.trim();
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err((lineno, format!("invalid variable name `{key}`")));
        }

        let value = parse_value(value.trim()).map_err(|msg| (lineno, msg))?;
        out.push((key.to_string(), value));
    }

    Ok(out)
}

fn parse_value(raw: &str) -> std::result::Result<String, String> {
    if let Some(rest) = raw.strip_prefix('\'') {
        let end = rest
            .find('\'')
            .ok_or_else(|| "unterminated single-quoted value".to_string())?;
        return Ok(rest[..end].to_string());
    }

    if let Some(rest) = raw.strip_prefix('"') {
        let mut value = String::new();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => return Ok(value),
                '\\' => match chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => break,
                },
                other => value.push(other),
            }
        }
        return Err("unterminated double-quoted value".to_string());
    }

    // Unquoted: ` #` starts a comment.
    let value = match raw.find(" #") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    Ok(value.trim().to_string())
}
