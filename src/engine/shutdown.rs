// src/engine/shutdown.rs

//! Shutdown signal and ready gate, both latched booleans over `watch`.

use std::sync::Arc;

use tokio::sync::watch;

/// A one-way latch: once opened it stays open, and every clone observes it.
#[derive(Debug, Clone)]
struct Latch {
    tx: Arc<watch::Sender<bool>>,
}

impl Latch {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Returns true if this call opened the latch.
    fn open(&self) -> bool {
        self.tx.send_if_modified(|open| {
            if *open {
                false
            } else {
                *open = true;
                true
            }
        })
    }

    fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    async fn opened(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only errors if it
        // somehow closed; treat that as open.
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// Shared cancellation signal for the command processor and the process it
/// is running.
#[derive(Debug, Clone)]
pub struct Shutdown {
    latch: Latch,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            latch: Latch::new(),
        }
    }

    /// Request shutdown. Returns true for the first caller only.
    pub fn trigger(&self) -> bool {
        self.latch.open()
    }

    pub fn is_triggered(&self) -> bool {
        self.latch.is_open()
    }

    /// Resolves once shutdown has been requested (immediately if it already was).
    pub async fn cancelled(&self) {
        self.latch.opened().await
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Opened by the presentation adapter once it can render; the processor does
/// not take work before that.
#[derive(Debug, Clone)]
pub struct ReadyGate {
    latch: Latch,
}

impl ReadyGate {
    pub fn new() -> Self {
        Self {
            latch: Latch::new(),
        }
    }

    pub fn open(&self) {
        self.latch.open();
    }

    pub fn is_open(&self) -> bool {
        self.latch.is_open()
    }

    pub async fn wait(&self) {
        self.latch.opened().await
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}
