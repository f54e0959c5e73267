// src/engine/mod.rs

//! Queue engine for cmdqueue.
//!
//! This module ties together:
//! - the shared state: bounded [`LogBuffer`], [`StatusCell`], [`TaskQueue`]
//! - the [`QueueHandle`] context object handed to presentation adapters
//! - the [`CommandProcessor`] loop that reacts to:
//!   - items popped off the queue
//!   - process resolution
//!   - shutdown
//!
//! The pure state machine lives in [`core`]; the async/IO shell is
//! implemented in [`processor`].

use crate::exec::{CommandLine, RunOutcome};

/// Where the command processor is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    WaitingForTask,
    Running,
    ShuttingDown,
}

/// Events flowing into the processor core.
#[derive(Debug, Clone)]
pub enum ProcessorEvent {
    /// The ready gate opened and the loop is about to start.
    Started { prefix: String },
    /// An item was popped off the queue.
    Dequeued(QueueItem),
    /// The launched process resolved.
    Finished {
        command: CommandLine,
        outcome: RunOutcome,
    },
    /// The process could not be started.
    LaunchFailed { command: CommandLine, reason: String },
    /// Cancellation observed at the loop boundary.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod handle;
pub mod log_buffer;
pub mod notify;
pub mod processor;
pub mod queue;
pub mod shutdown;
pub mod status;

pub use core::ProcessorCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use handle::{QueueHandle, QueueSettings};
pub use log_buffer::{LineKind, LogBuffer, LogLine};
pub use notify::ChangeNotifier;
pub use processor::CommandProcessor;
pub use queue::{QueueItem, Task, TaskQueue};
pub use shutdown::{ReadyGate, Shutdown};
pub use status::{IDLE, Status, StatusCell};
pub use crate::types::FullQueuePolicy;
