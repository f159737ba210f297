// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsSoonError {
    #[error("please specify a command")]
    MissingCommand,

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("cannot watch {target:?}: parent directory {parent:?} does not exist")]
    MissingParent { target: PathBuf, parent: PathBuf },

    #[error("Watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AsSoonError {
    /// Errors caused by how the tool was invoked (bad arguments, bad config,
    /// impossible watch targets) rather than by the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AsSoonError::MissingCommand
                | AsSoonError::Usage(_)
                | AsSoonError::ConfigError(_)
                | AsSoonError::MissingParent { .. }
                | AsSoonError::TomlError(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AsSoonError>;
