// crates/test-utils/src/fake_runner.rs

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cmdqueue::engine::{LineKind, LogBuffer, QueueHandle, Shutdown, Status};
use cmdqueue::errors::{CmdQueueError, Result};
use cmdqueue::exec::{CommandLine, ProcessRunner, RunOutcome};

/// What the fake does for one command line.
#[derive(Debug, Clone)]
enum Script {
    /// Append these stdout lines, then resolve with the outcome.
    Output(Vec<String>, RunOutcome),
    /// Refuse to start.
    LaunchFailure,
    /// Run until shutdown fires, then resolve as cancelled.
    Hang,
}

/// A fake runner that:
/// - records every command line it was asked to run, in order
/// - writes scripted stdout lines into the log
/// - resolves with `Exited(0)` unless scripted otherwise.
///
/// Scripts are keyed by the full command line as displayed (`"echo a b"`).
///
/// With [`FakeRunner::observing`], the status and the newest log line are
/// captured each time a run begins.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    executed: Arc<Mutex<Vec<String>>>,
    scripts: HashMap<String, Script>,
    observer: Option<QueueHandle>,
    seen: Arc<Mutex<Vec<SeenOnEntry>>>,
}

/// What the shared state looked like when a run began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenOnEntry {
    pub command: String,
    pub status: Status,
    pub last_line: Option<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared list of executed command lines.
    pub fn executed(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }

    /// Record what `handle` shows at the start of every run.
    pub fn observing(mut self, handle: QueueHandle) -> Self {
        self.observer = Some(handle);
        self
    }

    /// Shared list of observations, one per run, in order.
    pub fn seen(&self) -> Arc<Mutex<Vec<SeenOnEntry>>> {
        Arc::clone(&self.seen)
    }

    pub fn with_output(mut self, line: &str, stdout: &[&str], outcome: RunOutcome) -> Self {
        let stdout = stdout.iter().map(|s| s.to_string()).collect();
        self.scripts
            .insert(line.to_string(), Script::Output(stdout, outcome));
        self
    }

    pub fn with_launch_failure(mut self, line: &str) -> Self {
        self.scripts.insert(line.to_string(), Script::LaunchFailure);
        self
    }

    pub fn hanging(mut self, line: &str) -> Self {
        self.scripts.insert(line.to_string(), Script::Hang);
        self
    }
}

impl ProcessRunner for FakeRunner {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandLine,
        log: &'a LogBuffer,
        shutdown: &'a Shutdown,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutcome>> + Send + 'a>> {
        let line = command.to_string();
        let script = self
            .scripts
            .get(&line)
            .cloned()
            .unwrap_or(Script::Output(Vec::new(), RunOutcome::Exited(0)));
        let executed = Arc::clone(&self.executed);

        if let Some(handle) = &self.observer {
            let last_line = handle.log_snapshot().pop().map(|l| l.text);
            self.seen.lock().unwrap().push(SeenOnEntry {
                command: line.clone(),
                status: handle.status(),
                last_line,
            });
        }

        Box::pin(async move {
            let (stdout, outcome) = match script {
                Script::LaunchFailure => {
                    return Err(CmdQueueError::Launch {
                        command: line,
                        source: io::Error::new(io::ErrorKind::NotFound, "no such program"),
                    });
                }
                Script::Hang => {
                    executed.lock().unwrap().push(line);
                    shutdown.cancelled().await;
                    return Ok(RunOutcome::Cancelled);
                }
                Script::Output(stdout, outcome) => (stdout, outcome),
            };

            executed.lock().unwrap().push(line);
            for text in stdout {
                log.append(LineKind::Stdout, text);
            }
            Ok(outcome)
        })
    }
}
