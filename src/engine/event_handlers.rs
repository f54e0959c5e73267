// src/engine/event_handlers.rs

//! Event handling logic for the processor core.

use tracing::{debug, warn};

use crate::engine::log_buffer::LineKind;
use crate::engine::queue::{QueueItem, Task};
use crate::engine::status::Status;
use crate::engine::ProcessorState;
use crate::exec::{CommandLine, RunOutcome};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Overwrite the status cell.
    SetStatus(Status),
    /// Append one line to the log buffer.
    AppendLog(LineKind, String),
    /// Run this command line and report back with `Finished`/`LaunchFailed`.
    Launch(CommandLine),
    /// Refuse further submissions.
    CloseQueue,
}

/// Decision returned by the core after handling a single `ProcessorEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer processor loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// The ready gate opened; announce the prefix in use.
pub fn handle_started(prefix: &str) -> CoreStep {
    CoreStep::continue_with(vec![CoreCommand::AppendLog(
        LineKind::Info,
        format!("Command processor started. Using command prefix: {prefix}"),
    )])
}

/// An item was taken off the queue.
///
/// - `Idle` only resets the status.
/// - A task whose prefix has no tokens is resolved on the spot with an
///   error line; nothing is launched.
/// - Otherwise the status is set and the `$ command` line written *before*
///   the launch, so both precede any output of the process.
pub fn handle_dequeued(state: &mut ProcessorState, item: QueueItem) -> CoreStep {
    if *state != ProcessorState::WaitingForTask {
        warn!(?state, ?item, "dequeued an item while not waiting for one; ignoring");
        return CoreStep::continue_with(Vec::new());
    }

    match item {
        QueueItem::Idle => {
            debug!("idle sentinel dequeued");
            CoreStep::continue_with(vec![CoreCommand::SetStatus(Status::Idle)])
        }
        QueueItem::Run(task) => start_task(state, task),
    }
}

fn start_task(state: &mut ProcessorState, task: Task) -> CoreStep {
    match CommandLine::assemble(&task.prefix, &task.suffix) {
        Ok(command) => {
            *state = ProcessorState::Running;
            let shown = command.to_string();
            CoreStep::continue_with(vec![
                CoreCommand::SetStatus(Status::Running(shown.clone())),
                CoreCommand::AppendLog(LineKind::Command, format!("$ {shown}")),
                CoreCommand::Launch(command),
            ])
        }
        Err(err) => {
            warn!(prefix = %task.prefix, suffix = %task.suffix, "task has no executable");
            CoreStep::continue_with(vec![
                CoreCommand::AppendLog(LineKind::Error, format!("Error: {err}")),
                CoreCommand::SetStatus(Status::Idle),
            ])
        }
    }
}

/// The running process resolved (any outcome).
pub fn handle_finished(
    state: &mut ProcessorState,
    completed: &mut u64,
    command: &CommandLine,
    outcome: &RunOutcome,
) -> CoreStep {
    debug!(command = %command, ?outcome, "task resolved");
    *state = ProcessorState::WaitingForTask;
    *completed += 1;

    CoreStep::continue_with(vec![
        CoreCommand::AppendLog(LineKind::Completion, outcome.to_string()),
        CoreCommand::SetStatus(Status::Idle),
    ])
}

/// The OS refused to start the process.
pub fn handle_launch_failed(
    state: &mut ProcessorState,
    command: &CommandLine,
    reason: &str,
) -> CoreStep {
    debug!(command = %command, reason, "launch failed");
    *state = ProcessorState::WaitingForTask;

    CoreStep::continue_with(vec![
        CoreCommand::AppendLog(LineKind::Error, format!("Error: {reason}")),
        CoreCommand::SetStatus(Status::Idle),
    ])
}

/// Cancellation observed at the loop boundary.
pub fn handle_shutdown(state: &mut ProcessorState) -> CoreStep {
    *state = ProcessorState::ShuttingDown;

    CoreStep {
        commands: vec![
            CoreCommand::CloseQueue,
            CoreCommand::SetStatus(Status::Idle),
            CoreCommand::AppendLog(
                LineKind::Info,
                "Command processor shutting down...".to_string(),
            ),
        ],
        keep_running: false,
    }
}
