// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod watch;

use std::sync::Arc;

use tracing::{error, info};

use crate::cli::CliArgs;
use crate::config::Settings;
use crate::engine::{Runtime, RuntimeOptions, WatchEvent, event_channel};
use crate::errors::Result;
use crate::exec::{CommandSpec, DebouncedExecutor, RealExecutorBackend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{NotifyNotifier, resolve_targets};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - argument validation and config merging
/// - target resolution
/// - environment loading
/// - notifier, executor and runtime
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let invocation = args.invocation()?;
    let settings = Settings::resolve(&args)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cwd = std::env::current_dir()?;

    let raw_targets = settings.watch_targets(&invocation.watch_targets);
    let targets = resolve_targets(fs.as_ref(), &raw_targets, &cwd);
    for target in &targets {
        info!(path = ?target.path, kind = %target.kind, "watch target `{}`", target.display);
    }

    let envs = env::load_env(fs.as_ref(), &cwd, &settings.mode)?.without_process_overrides();
    let command =
        CommandSpec::new(invocation.command, invocation.command_args).with_envs(envs.into_map());

    let (rt_tx, rt_rx) = event_channel();

    let notifier = NotifyNotifier::new(rt_tx.clone(), Arc::clone(&fs));
    let executor = DebouncedExecutor::new(
        command,
        RealExecutorBackend::new(rt_tx.clone()),
        settings.debounce,
    );

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl-C");
                return;
            }
            let _ = tx.send(WatchEvent::ShutdownRequested);
        });
    }

    let options = RuntimeOptions {
        settle: settings.settle,
    };

    let runtime = Runtime::new(targets, fs, notifier, executor, (rt_tx, rt_rx), options);
    runtime.run().await
}
