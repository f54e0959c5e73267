// src/engine/notify.rs

//! Change notification for presentation adapters.
//!
//! Every mutation of the log, status or queue bumps a revision counter held
//! in a `watch` channel. Adapters hold a receiver and redraw whenever
//! `changed()` resolves; intermediate revisions may be coalesced.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: Arc<watch::Sender<u64>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Record that shared state changed.
    pub fn bump(&self) {
        self.tx.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Receiver of the revision counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
