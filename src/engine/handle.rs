// src/engine/handle.rs

//! The context object shared between the command processor and presentation
//! adapters.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::config::model::{DEFAULT_COMMAND_PREFIX, DEFAULT_MAX_LOG_LINES, DEFAULT_QUEUE_CAPACITY};
use crate::errors::Result;
use crate::types::FullQueuePolicy;

use super::log_buffer::{LogBuffer, LogLine};
use super::notify::ChangeNotifier;
use super::queue::{QueueItem, Task, TaskQueue};
use super::shutdown::{ReadyGate, Shutdown};
use super::status::{Status, StatusCell};

/// Effective settings for one queue instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    /// Prefix used by [`QueueHandle::submit`].
    pub prefix: String,
    pub queue_capacity: usize,
    pub max_log_lines: usize,
    pub on_full: FullQueuePolicy,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_log_lines: DEFAULT_MAX_LOG_LINES,
            on_full: FullQueuePolicy::default(),
        }
    }
}

impl From<&ConfigFile> for QueueSettings {
    fn from(cfg: &ConfigFile) -> Self {
        Self {
            prefix: cfg.command.prefix.clone(),
            queue_capacity: cfg.queue.capacity,
            max_log_lines: cfg.log.max_lines,
            on_full: cfg.queue.on_full,
        }
    }
}

/// Cloneable handle to one queue's shared state.
///
/// Built once at startup with [`QueueHandle::new`], cloned into the
/// [`CommandProcessor`](super::CommandProcessor) and into every presentation
/// adapter. Adapters only use the submission and snapshot methods; the log
/// and status are written by the processor alone.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    prefix: Arc<str>,
    log: LogBuffer,
    status: StatusCell,
    queue: TaskQueue,
    ready: ReadyGate,
    shutdown: Shutdown,
    changes: ChangeNotifier,
}

impl QueueHandle {
    pub fn new(settings: &QueueSettings) -> Self {
        let changes = ChangeNotifier::new();
        Self {
            prefix: Arc::from(settings.prefix.as_str()),
            log: LogBuffer::new(settings.max_log_lines, changes.clone()),
            status: StatusCell::new(changes.clone()),
            queue: TaskQueue::new(settings.queue_capacity, settings.on_full, changes.clone()),
            ready: ReadyGate::new(),
            shutdown: Shutdown::new(),
            changes,
        }
    }

    /// The process-wide command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Queue `suffix` behind the process-wide prefix.
    ///
    /// With the `Reject` policy this fails with `QueueFull` instead of
    /// waiting; with `Wait` it resolves once there is room.
    pub async fn submit(&self, suffix: &str) -> Result<()> {
        self.submit_with_prefix(&self.prefix, suffix).await
    }

    /// Queue a task with its own prefix.
    pub async fn submit_with_prefix(&self, prefix: &str, suffix: &str) -> Result<()> {
        self.queue
            .push(QueueItem::Run(Task::new(prefix, suffix)))
            .await?;
        info!(prefix, suffix, depth = self.queue.len(), "task queued");
        Ok(())
    }

    /// Like [`submit`](Self::submit) but never waits, whatever the policy.
    pub fn try_submit(&self, suffix: &str) -> Result<()> {
        self.queue
            .try_push(QueueItem::Run(Task::new(&*self.prefix, suffix)))?;
        info!(suffix, depth = self.queue.len(), "task queued");
        Ok(())
    }

    /// Queue the idle sentinel: when reached, the status is reset and
    /// nothing runs.
    pub async fn submit_idle(&self) -> Result<()> {
        self.queue.push(QueueItem::Idle).await?;
        debug!("idle sentinel queued");
        Ok(())
    }

    pub fn log_snapshot(&self) -> Vec<LogLine> {
        self.log.snapshot()
    }

    /// Lines appended after the line numbered `seq` (still retained).
    pub fn log_lines_after(&self, seq: u64) -> Vec<LogLine> {
        self.log.lines_after(seq)
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    /// Best-effort count of pending items, for display only.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Best-effort listing of pending items, oldest first.
    pub fn pending(&self) -> Vec<QueueItem> {
        self.queue.pending()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Receiver whose value changes whenever log, status or queue change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Let the processor start taking work.
    pub fn mark_ready(&self) {
        self.ready.open();
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_open()
    }

    /// Request shutdown: the processor stops dequeuing and kills the
    /// process in flight, if any.
    pub fn shutdown(&self) {
        if self.shutdown.trigger() {
            info!("shutdown requested");
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Resolves once shutdown has been requested.
    pub async fn shutdown_requested(&self) {
        self.shutdown.cancelled().await
    }

    pub(crate) fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub(crate) fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    pub(crate) fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub(crate) fn ready_gate(&self) -> &ReadyGate {
        &self.ready
    }

    pub(crate) fn shutdown_signal(&self) -> &Shutdown {
        &self.shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CmdQueueError;

    fn settings(capacity: usize) -> QueueSettings {
        QueueSettings {
            prefix: "echo".into(),
            queue_capacity: capacity,
            max_log_lines: 10,
            on_full: FullQueuePolicy::Reject,
        }
    }

    #[tokio::test]
    async fn submit_uses_process_wide_prefix() {
        let handle = QueueHandle::new(&settings(4));
        handle.submit("a b").await.unwrap();
        handle.submit_with_prefix("ls -l", "").await.unwrap();
        handle.submit_idle().await.unwrap();

        assert_eq!(handle.queue_depth(), 3);
        assert_eq!(
            handle.pending(),
            vec![
                QueueItem::Run(Task::new("echo", "a b")),
                QueueItem::Run(Task::new("ls -l", "")),
                QueueItem::Idle,
            ]
        );
    }

    #[tokio::test]
    async fn full_queue_is_reported() {
        let handle = QueueHandle::new(&settings(1));
        handle.try_submit("one").unwrap();
        assert!(matches!(
            handle.submit("two").await,
            Err(CmdQueueError::QueueFull { capacity: 1 })
        ));
    }

    #[tokio::test]
    async fn submissions_bump_the_revision() {
        let handle = QueueHandle::new(&settings(4));
        let mut rx = handle.subscribe();
        let before = *rx.borrow_and_update();

        handle.submit("x").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow() > before);
    }

    #[test]
    fn starts_idle_and_not_ready() {
        let handle = QueueHandle::new(&QueueSettings::default());
        assert_eq!(handle.status(), Status::Idle);
        assert!(!handle.is_ready());
        assert!(!handle.is_shutting_down());
        assert_eq!(handle.prefix(), "yt-dlp -f 233");
        assert_eq!(handle.queue_capacity(), 100);
    }
}
