// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`debounce`] coalesces triggers into single runs and keeps runs from
//!   overlapping.
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `RealExecutorBackend`; tests swap in a fake.
//! - [`runner`] spawns the user command with inherited stdio and reports the
//!   outcome back to the runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::RunId;

pub mod backend;
pub mod debounce;
pub mod runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use debounce::{DebouncedExecutor, Debouncer, PendingCommandState};

/// The user command, exactly as it will be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables from `.env` files.
    pub envs: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            envs: BTreeMap::new(),
        }
    }

    pub fn with_envs(mut self, envs: BTreeMap<String, String>) -> Self {
        self.envs = envs;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One execution handed to an [`ExecutorBackend`].
#[derive(Debug, Clone)]
pub struct ScheduledRun {
    pub id: RunId,
    pub command: Arc<CommandSpec>,
}
