// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The parsed [`CliArgs`] are turned into an immutable [`Invocation`]
//! (command, its arguments, watch targets) before anything else runs.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};

use crate::errors::{AsSoonError, Result};

/// Command-line arguments for `as-soon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "as-soon",
    version,
    about = "Re-run a command as soon as watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to watch (file, directory, or a path that does not exist yet).
    ///
    /// May be repeated. Defaults to the current working directory.
    #[arg(short = 'w', long = "w", value_name = "PATH", action = ArgAction::Append)]
    pub watch: Vec<String>,

    /// Deployment context used to select `.env.<mode>` files.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Quiet period before a burst of changes re-runs the command.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Delay between seeing a watched path appear and watching it directly.
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Optional config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AS_SOON_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// What the user asked for, independent of how it was spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub command_args: Vec<String>,
    /// Raw watch targets in CLI order. Empty means "use the configured
    /// default", which ultimately falls back to the working directory.
    pub watch_targets: Vec<String>,
}

impl CliArgs {
    /// Split the trailing command tokens into program + arguments.
    pub fn invocation(&self) -> Result<Invocation> {
        let (command, command_args) = self
            .command
            .split_first()
            .ok_or(AsSoonError::MissingCommand)?;

        // Unknown options land in the trailing command because it accepts
        // hyphenated values.
        if command.starts_with('-') {
            return Err(AsSoonError::Usage(format!(
                "error: unexpected option `{command}` before the command\n\n{}",
                usage()
            )));
        }

        Ok(Invocation {
            command: command.clone(),
            command_args: command_args.to_vec(),
            watch_targets: self.watch.clone(),
        })
    }
}

/// Parse the process arguments.
///
/// `--help` and `--version` print and exit with 0; any other parse failure is
/// an [`AsSoonError::Usage`].
pub fn parse() -> Result<CliArgs> {
    CliArgs::try_parse().map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => AsSoonError::Usage(e.to_string()),
    })
}

/// Parse a raw token list (including the program name) into an
/// [`Invocation`] without touching the process environment.
pub fn parse_from<I, T>(tokens: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = CliArgs::try_parse_from(tokens).map_err(|e| AsSoonError::Usage(e.to_string()))?;
    args.invocation()
}

/// One-line usage string, printed when no command is given.
pub fn usage() -> String {
    CliArgs::command().render_usage().to_string()
}
