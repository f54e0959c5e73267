// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running one task's command line
//! with `tokio::process::Command` and streaming its output into the shared
//! log.
//!
//! - [`command`] turns a prefix and suffix into a [`CommandLine`].
//! - [`backend`] provides the [`ProcessRunner`] trait the command processor
//!   talks to, so tests can swap in a fake.
//! - [`task_runner`] is the production [`SubprocessRunner`].

pub mod backend;
pub mod command;
pub mod task_runner;

use std::fmt;

pub use backend::ProcessRunner;
pub use command::CommandLine;
pub use task_runner::SubprocessRunner;

/// How a launched process resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited on its own with this code.
    Exited(i32),
    /// The process ended without an exit code (killed by a signal).
    Terminated,
    /// Shutdown was requested while the process ran; it was killed.
    Cancelled,
    /// Waiting for the process failed.
    WaitFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Exited(0))
    }
}

/// The completion line written to the log for this outcome.
impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Exited(code) => write!(f, "Process finished. Exit code: {code}"),
            RunOutcome::Terminated => f.write_str("Command failed: process terminated by signal"),
            RunOutcome::Cancelled => {
                f.write_str("Command cancelled: process killed on shutdown")
            }
            RunOutcome::WaitFailed(reason) => write!(f, "Command failed: {reason}"),
        }
    }
}
