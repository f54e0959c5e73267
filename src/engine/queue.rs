// src/engine/queue.rs

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, warn};

use super::notify::ChangeNotifier;
use crate::errors::{CmdQueueError, Result};
use crate::types::FullQueuePolicy;

/// One request to run the external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub prefix: String,
    pub suffix: String,
}

impl Task {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

/// What sits in the queue.
///
/// `Idle` is an explicit no-op: when dequeued it only resets the status. A
/// `Run` task with an empty suffix is *not* a no-op; it runs the prefix alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Run(Task),
    Idle,
}

impl fmt::Display for QueueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueItem::Run(task) => write!(f, "[{}] {}", task.prefix, task.suffix),
            QueueItem::Idle => f.write_str("(idle)"),
        }
    }
}

#[derive(Debug)]
struct Shared {
    items: Mutex<VecDeque<QueueItem>>,
    /// Signalled when an item is pushed (wakes the consumer).
    item_ready: Notify,
    /// Signalled when an item is popped or the queue closes (wakes producers
    /// parked by the `Wait` policy).
    space_ready: Notify,
    closed: AtomicBool,
}

/// Bounded FIFO between presentation adapters (producers) and the single
/// command processor (consumer).
///
/// Semantics:
/// - At most `capacity` items are buffered. What happens beyond that depends
///   on [`FullQueuePolicy`]: `Reject` fails with `QueueFull`, `Wait` parks the
///   producer until the consumer frees a slot.
/// - [`TaskQueue::pop`] parks the consumer until an item is available. It is
///   cancel-safe, so the processor can race it against shutdown.
/// - After [`TaskQueue::close`] every push fails with `QueueClosed`. Items
///   still buffered are left in place and never run.
///
/// `len()` and `pending()` are snapshots: by the time the caller looks at
/// them, producers or the consumer may already have moved on. They are for
/// display only.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    shared: Arc<Shared>,
    capacity: usize,
    policy: FullQueuePolicy,
    changes: ChangeNotifier,
}

impl TaskQueue {
    /// Create a new queue. `capacity` is clamped to at least 1, as a
    /// zero-length queue could never accept work.
    pub fn new(capacity: usize, policy: FullQueuePolicy, changes: ChangeNotifier) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(VecDeque::with_capacity(capacity)),
                item_ready: Notify::new(),
                space_ready: Notify::new(),
                closed: AtomicBool::new(false),
            }),
            capacity,
            policy,
            changes,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> FullQueuePolicy {
        self.policy
    }

    /// Approximate number of buffered items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Copy of the buffered items in FIFO order.
    pub fn pending(&self) -> Vec<QueueItem> {
        self.lock().iter().cloned().collect()
    }

    /// Push without waiting, regardless of policy.
    pub fn try_push(&self, item: QueueItem) -> Result<()> {
        if self.is_closed() {
            return Err(CmdQueueError::QueueClosed);
        }

        let depth = {
            let mut items = self.lock();
            if items.len() >= self.capacity {
                warn!(capacity = self.capacity, "task queue full; rejecting submission");
                return Err(CmdQueueError::QueueFull {
                    capacity: self.capacity,
                });
            }
            items.push_back(item);
            items.len()
        };

        debug!(depth, "enqueued item");
        self.shared.item_ready.notify_one();
        self.changes.bump();
        Ok(())
    }

    /// Push according to the configured [`FullQueuePolicy`].
    pub async fn push(&self, item: QueueItem) -> Result<()> {
        match self.policy {
            FullQueuePolicy::Reject => self.try_push(item),
            FullQueuePolicy::Wait => self.push_waiting(item).await,
        }
    }

    async fn push_waiting(&self, item: QueueItem) -> Result<()> {
        loop {
            let space = self.shared.space_ready.notified();
            tokio::pin!(space);
            // Register before checking so a pop between the check and the
            // await is not missed.
            space.as_mut().enable();

            match self.try_push(item.clone()) {
                Err(CmdQueueError::QueueFull { .. }) => {
                    debug!(capacity = self.capacity, "queue full; waiting for a free slot");
                    space.await;
                }
                other => return other,
            }
        }
    }

    /// Wait for and remove the oldest item.
    pub async fn pop(&self) -> QueueItem {
        loop {
            let ready = self.shared.item_ready.notified();
            tokio::pin!(ready);
            ready.as_mut().enable();

            if let Some(item) = self.try_pop() {
                return item;
            }
            ready.await;
        }
    }

    /// Remove the oldest item if there is one.
    pub fn try_pop(&self) -> Option<QueueItem> {
        let item = self.lock().pop_front()?;
        self.shared.space_ready.notify_one();
        self.changes.bump();
        Some(item)
    }

    /// Refuse further pushes and wake every parked producer.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            debug!(abandoned = self.len(), "task queue closed");
            self.shared.space_ready.notify_waiters();
            self.changes.bump();
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<QueueItem>> {
        self.shared
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn queue(capacity: usize, policy: FullQueuePolicy) -> TaskQueue {
        TaskQueue::new(capacity, policy, ChangeNotifier::new())
    }

    fn run(suffix: &str) -> QueueItem {
        QueueItem::Run(Task::new("echo", suffix))
    }

    #[tokio::test]
    async fn pops_in_fifo_order() {
        let q = queue(10, FullQueuePolicy::Reject);
        q.try_push(run("a")).unwrap();
        q.try_push(QueueItem::Idle).unwrap();
        q.try_push(run("b")).unwrap();

        assert_eq!(q.len(), 3);
        assert_eq!(q.pop().await, run("a"));
        assert_eq!(q.pop().await, QueueItem::Idle);
        assert_eq!(q.pop().await, run("b"));
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn reject_policy_fails_when_full() {
        let q = queue(2, FullQueuePolicy::Reject);
        q.push(run("1")).await.unwrap();
        q.push(run("2")).await.unwrap();

        match q.push(run("3")).await {
            Err(CmdQueueError::QueueFull { capacity }) => assert_eq!(capacity, 2),
            other => panic!("expected QueueFull, got {other:?}"),
        }
        assert_eq!(q.pending(), vec![run("1"), run("2")]);
    }

    #[tokio::test]
    async fn wait_policy_parks_until_pop() {
        let q = queue(1, FullQueuePolicy::Wait);
        q.push(run("first")).await.unwrap();

        let producer = {
            let q = q.clone();
            tokio::spawn(async move { q.push(run("second")).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished());
        assert_eq!(q.len(), 1);

        assert_eq!(q.pop().await, run("first"));
        tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should be released")
            .unwrap()
            .unwrap();
        assert_eq!(q.pending(), vec![run("second")]);
    }

    #[tokio::test]
    async fn close_wakes_parked_producers() {
        let q = queue(1, FullQueuePolicy::Wait);
        q.push(run("first")).await.unwrap();

        let producer = {
            let q = q.clone();
            tokio::spawn(async move { q.push(run("second")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        q.close();
        let result = tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should be released")
            .unwrap();
        assert!(matches!(result, Err(CmdQueueError::QueueClosed)));
        assert!(matches!(q.try_push(run("late")), Err(CmdQueueError::QueueClosed)));
    }

    #[tokio::test]
    async fn pop_waits_for_a_push() {
        let q = queue(4, FullQueuePolicy::Reject);
        let consumer = {
            let q = q.clone();
            tokio::spawn(async move { q.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        q.try_push(run("late")).unwrap();

        let item = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake")
            .unwrap();
        assert_eq!(item, run("late"));
    }

    #[test]
    fn display_lists_prefix_and_suffix() {
        assert_eq!(run("x y").to_string(), "[echo] x y");
        assert_eq!(QueueItem::Idle.to_string(), "(idle)");
    }
}
