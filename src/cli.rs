// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::FullQueuePolicy;

/// Command-line arguments for `cmdqueue`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdqueue",
    version,
    about = "Queue commands and run them one at a time, streaming their output.",
    long_about = None
)]
pub struct CliArgs {
    /// Command prefix prepended to every submitted suffix.
    ///
    /// Overrides `[command].prefix` from the config file.
    #[arg(long = "cmd", value_name = "PREFIX")]
    pub cmd: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `cmdqueue.toml` in the current working directory is used
    /// when it exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Maximum number of pending tasks.
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Maximum number of log lines kept in memory.
    #[arg(long, value_name = "N")]
    pub max_log_lines: Option<usize>,

    /// What to do when a task is submitted to a full queue.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_full: Option<FullQueuePolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDQUEUE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the effective settings, but don't start the queue.
    #[arg(long)]
    pub dry_run: bool,
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
