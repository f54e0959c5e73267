// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The command processor talks to a `ProcessRunner` instead of spawning
//! processes itself. Production code uses
//! [`SubprocessRunner`](super::SubprocessRunner); tests can provide a runner
//! that records command lines and writes scripted output without touching
//! the OS.

use std::future::Future;
use std::pin::Pin;

use crate::engine::{LogBuffer, Shutdown};
use crate::errors::Result;

use super::{CommandLine, RunOutcome};

/// Runs exactly one command line to completion.
pub trait ProcessRunner: Send {
    /// Execute `command`, appending every output line to `log` as it arrives.
    ///
    /// The implementation must:
    /// - return `Err` (normally [`CmdQueueError::Launch`]) only if the
    ///   process could not be started; nothing has been logged yet then;
    /// - not resolve before all of the process's output has been appended;
    /// - stop the process and resolve with [`RunOutcome::Cancelled`] once
    ///   `shutdown` fires.
    ///
    /// [`CmdQueueError::Launch`]: crate::errors::CmdQueueError::Launch
    fn run<'a>(
        &'a mut self,
        command: &'a CommandLine,
        log: &'a LogBuffer,
        shutdown: &'a Shutdown,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutcome>> + Send + 'a>>;
}
