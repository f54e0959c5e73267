// src/engine/log_buffer.rs

//! Bounded, thread-safe log of task output and processor notices.
//!
//! Writers are the command processor and the two stream readers of the
//! running process; readers are presentation adapters taking snapshots. Every
//! access goes through one mutex, and appends beyond the capacity silently
//! evict the oldest lines.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::notify::ChangeNotifier;

/// What produced a log line, so renderers can style it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Lifecycle notices (startup, shutdown).
    Info,
    /// The `$ command` line written when a task starts.
    Command,
    Stdout,
    Stderr,
    /// Non-fatal problems, e.g. a stream read error.
    Warning,
    /// Task-level failures: invalid command, launch error.
    Error,
    /// The final line of every launched task.
    Completion,
}

/// One retained log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Assigned on append; strictly increasing across the buffer's lifetime.
    pub seq: u64,
    pub kind: LineKind,
    pub text: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug)]
struct Inner {
    lines: VecDeque<LogLine>,
    next_seq: u64,
}

/// Cloneable handle to a shared log buffer holding at most `capacity` lines.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
    changes: ChangeNotifier,
}

impl LogBuffer {
    /// Create a buffer. `capacity` is clamped to at least 1.
    pub fn new(capacity: usize, changes: ChangeNotifier) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                lines: VecDeque::with_capacity(capacity),
                next_seq: 1,
            })),
            capacity,
            changes,
        }
    }

    /// Append a line, dropping the oldest lines once over capacity.
    ///
    /// Returns the sequence number assigned to the line.
    pub fn append(&self, kind: LineKind, text: impl Into<String>) -> u64 {
        let seq = {
            let mut inner = self.lock();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.lines.push_back(LogLine {
                seq,
                kind,
                text: text.into(),
            });
            while inner.lines.len() > self.capacity {
                inner.lines.pop_front();
            }
            seq
        };
        self.changes.bump();
        seq
    }

    /// Ordered copy of every retained line.
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lock().lines.iter().cloned().collect()
    }

    /// Retained lines with a sequence number greater than `seq`.
    ///
    /// Lines that were already evicted are not returned; callers that fall
    /// more than `capacity` lines behind lose the gap.
    pub fn lines_after(&self, seq: u64) -> Vec<LogLine> {
        let inner = self.lock();
        let skip = inner.lines.partition_point(|line| line.seq <= seq);
        inner.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
