// src/engine/status.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::notify::ChangeNotifier;

/// Literal shown while nothing is running.
pub const IDLE: &str = "Idle";

/// What the processor is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    /// The fully assembled command line of the task in flight.
    Running(String),
}

impl Status {
    pub fn is_idle(&self) -> bool {
        matches!(self, Status::Idle)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str(IDLE),
            Status::Running(cmd) => f.write_str(cmd),
        }
    }
}

/// Shared single-value cell holding the current [`Status`].
#[derive(Debug, Clone)]
pub struct StatusCell {
    inner: Arc<Mutex<Status>>,
    changes: ChangeNotifier,
}

impl StatusCell {
    pub fn new(changes: ChangeNotifier) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Status::Idle)),
            changes,
        }
    }

    pub fn set(&self, status: Status) {
        *self.lock() = status;
        self.changes.bump();
    }

    pub fn get(&self) -> Status {
        self.lock().clone()
    }

    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    fn lock(&self) -> MutexGuard<'_, Status> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
