// src/types.rs

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// What `submit` does when the task queue is already at capacity.
///
/// - `Reject`: fail the submission with `QueueFull` straight away, so the
///   caller (typically a UI thread) never stalls (default behaviour).
/// - `Wait`: park the submitting future until the processor frees a slot.
///
/// Read from `[queue].on_full` in the config file and from `--on-full` on
/// the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FullQueuePolicy {
    #[default]
    Reject,
    Wait,
}

impl fmt::Display for FullQueuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FullQueuePolicy::Reject => f.write_str("reject"),
            FullQueuePolicy::Wait => f.write_str("wait"),
        }
    }
}
