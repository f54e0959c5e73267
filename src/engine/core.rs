// src/engine/core.rs

//! Pure core state machine of the command processor.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`ProcessorEvent`]s and produces:
//! - an updated [`ProcessorState`]
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::processor::CommandProcessor`) is responsible
//! for popping the queue, racing it against shutdown, running processes and
//! touching the shared log/status.
//!
//! The core is unit tested without any Tokio, channels or processes.

use crate::engine::event_handlers::{
    CoreStep, handle_dequeued, handle_finished, handle_launch_failed, handle_shutdown,
    handle_started,
};
use crate::engine::{ProcessorEvent, ProcessorState};

/// Pure processor state: where in the loop we are and how many tasks ran.
#[derive(Debug)]
pub struct ProcessorCore {
    state: ProcessorState,
    completed: u64,
}

impl ProcessorCore {
    pub fn new() -> Self {
        Self {
            state: ProcessorState::WaitingForTask,
            completed: 0,
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Number of launched tasks that have resolved (exited, failed or were
    /// cancelled).
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Handle a single event, updating state and returning the resulting
    /// commands for the IO shell.
    ///
    /// Once `ShuttingDown`, every further event is ignored.
    pub fn step(&mut self, event: ProcessorEvent) -> CoreStep {
        if self.state == ProcessorState::ShuttingDown {
            return CoreStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        match event {
            ProcessorEvent::Started { prefix } => handle_started(&prefix),
            ProcessorEvent::Dequeued(item) => handle_dequeued(&mut self.state, item),
            ProcessorEvent::Finished { command, outcome } => {
                handle_finished(&mut self.state, &mut self.completed, &command, &outcome)
            }
            ProcessorEvent::LaunchFailed { command, reason } => {
                handle_launch_failed(&mut self.state, &command, &reason)
            }
            ProcessorEvent::ShutdownRequested => handle_shutdown(&mut self.state),
        }
    }
}

impl Default for ProcessorCore {
    fn default() -> Self {
        Self::new()
    }
}
