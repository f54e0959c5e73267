// tests/common/mod.rs

#![allow(dead_code)]

pub use cmdqueue_test_utils::builders;
pub use cmdqueue_test_utils::{init_tracing, wait_until, with_timeout};

use cmdqueue::engine::{CommandProcessor, LineKind, QueueHandle, QueueSettings};
use cmdqueue::errors::Result;
use cmdqueue::exec::ProcessRunner;
use tokio::task::JoinHandle;

/// Build a handle and spawn a processor for it. The ready gate is left
/// closed; call `mark_ready` to let it start.
pub fn spawn_processor<R>(settings: &QueueSettings, runner: R) -> (QueueHandle, JoinHandle<Result<()>>)
where
    R: ProcessRunner + 'static,
{
    let handle = QueueHandle::new(settings);
    let task = spawn_on(&handle, runner);
    (handle, task)
}

/// Spawn a processor for an existing handle.
pub fn spawn_on<R>(handle: &QueueHandle, runner: R) -> JoinHandle<Result<()>>
where
    R: ProcessRunner + 'static,
{
    tokio::spawn(CommandProcessor::new(handle.clone(), runner).run())
}

/// Texts of the retained log lines, oldest first.
pub fn log_texts(handle: &QueueHandle) -> Vec<String> {
    handle.log_snapshot().into_iter().map(|l| l.text).collect()
}

/// Texts of the retained log lines of one kind.
pub fn texts_of(handle: &QueueHandle, kind: LineKind) -> Vec<String> {
    handle
        .log_snapshot()
        .into_iter()
        .filter(|l| l.kind == kind)
        .map(|l| l.text)
        .collect()
}

pub fn completions(handle: &QueueHandle) -> usize {
    texts_of(handle, LineKind::Completion).len()
}
