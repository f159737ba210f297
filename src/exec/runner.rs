// src/exec/runner.rs

//! Runs the user command once.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::engine::{EventSender, RunOutcome, WatchEvent};

use super::ScheduledRun;

/// Run the command to completion with inherited stdio and report the outcome.
///
/// Spawn failures are reported as [`RunOutcome::SpawnFailed`] and never
/// propagate; the executor logs the outcome.
pub async fn run_command(run: ScheduledRun, runtime_tx: EventSender) {
    let outcome = match run_inner(&run).await {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(run = run.id, error = %format!("{err:#}"), "spawn failed");
            RunOutcome::SpawnFailed(format!("{err:#}"))
        }
    };

    if runtime_tx
        .send(WatchEvent::RunFinished {
            run: run.id,
            outcome,
        })
        .is_err()
    {
        debug!(run = run.id, "runtime gone before run finished");
    }
}

async fn run_inner(run: &ScheduledRun) -> Result<RunOutcome> {
    let spec = &run.command;

    // No shell: program and arguments are passed through verbatim.
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.envs)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{}`", spec.program))?;

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{}`", spec.program))?;

    Ok(if status.success() {
        RunOutcome::Success
    } else {
        RunOutcome::Failed(status.code().unwrap_or(-1))
    })
}
