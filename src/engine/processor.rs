// src/engine/processor.rs

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::{CommandLine, ProcessRunner};

use super::core::ProcessorCore;
use super::handle::QueueHandle;
use super::{CoreCommand, ProcessorEvent};

/// The single worker that drains the task queue.
///
/// This is the async IO shell around [`ProcessorCore`], which holds the
/// state machine. The shell:
/// - waits for the ready gate,
/// - pops the queue, racing each pop against shutdown,
/// - executes the commands the core returns (status, log, launch),
/// - runs one process at a time through its [`ProcessRunner`] and feeds the
///   result back into the core before popping again.
pub struct CommandProcessor<R: ProcessRunner> {
    core: ProcessorCore,
    handle: QueueHandle,
    runner: R,
}

impl<R: ProcessRunner> fmt::Debug for CommandProcessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandProcessor")
            .field("core", &self.core)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl<R: ProcessRunner> CommandProcessor<R> {
    pub fn new(handle: QueueHandle, runner: R) -> Self {
        Self {
            core: ProcessorCore::new(),
            handle,
            runner,
        }
    }

    /// Main loop. Returns once shutdown has been requested and handled.
    pub async fn run(mut self) -> Result<()> {
        debug!("command processor waiting for ready gate");

        let ready = tokio::select! {
            biased;
            _ = self.handle.shutdown_signal().cancelled() => false,
            _ = self.handle.ready_gate().wait() => true,
        };

        if ready {
            info!(prefix = %self.handle.prefix(), "command processor started");
            let prefix = self.handle.prefix().to_string();
            self.dispatch(ProcessorEvent::Started { prefix }).await;
        }

        loop {
            let event = tokio::select! {
                biased;
                _ = self.handle.shutdown_signal().cancelled() => ProcessorEvent::ShutdownRequested,
                item = self.handle.queue().pop() => ProcessorEvent::Dequeued(item),
            };

            debug!(?event, "processor received event");

            if !self.dispatch(event).await {
                break;
            }
        }

        info!(completed = self.core.completed(), "command processor stopped");
        Ok(())
    }

    /// Feed one event into the core and carry out the resulting commands.
    ///
    /// A `Launch` runs the process to completion right here, so the next pop
    /// only happens after the task resolved. Returns false once the core
    /// says to stop.
    async fn dispatch(&mut self, event: ProcessorEvent) -> bool {
        let mut events = VecDeque::from([event]);

        while let Some(event) = events.pop_front() {
            let step = self.core.step(event);

            for command in step.commands {
                if let Some(follow_up) = self.execute_command(command).await {
                    events.push_back(follow_up);
                }
            }

            if !step.keep_running {
                return false;
            }
        }

        true
    }

    async fn execute_command(&mut self, cmd: CoreCommand) -> Option<ProcessorEvent> {
        match cmd {
            CoreCommand::SetStatus(status) => {
                self.handle.status_cell().set(status);
                None
            }
            CoreCommand::AppendLog(kind, text) => {
                self.handle.log().append(kind, text);
                None
            }
            CoreCommand::CloseQueue => {
                self.handle.queue().close();
                None
            }
            CoreCommand::Launch(command) => Some(self.launch(command).await),
        }
    }

    async fn launch(&mut self, command: CommandLine) -> ProcessorEvent {
        let result = self
            .runner
            .run(
                &command,
                self.handle.log(),
                self.handle.shutdown_signal(),
            )
            .await;

        match result {
            Ok(outcome) => ProcessorEvent::Finished { command, outcome },
            Err(err) => {
                warn!(command = %command, error = %err, "could not start process");
                ProcessorEvent::LaunchFailed {
                    command,
                    reason: err.to_string(),
                }
            }
        }
    }
}
