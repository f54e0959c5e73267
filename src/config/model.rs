// src/config/model.rs

use serde::Deserialize;

use crate::types::FullQueuePolicy;

/// Prefix used when neither the config file nor `--cmd` supplies one.
pub const DEFAULT_COMMAND_PREFIX: &str = "yt-dlp -f 233";

/// Default number of pending tasks the queue will hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default number of log lines retained in memory.
pub const DEFAULT_MAX_LOG_LINES: usize = 200;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [command]
/// prefix = "yt-dlp -f 233"
///
/// [queue]
/// capacity = 100
/// on_full = "reject"
///
/// [log]
/// max_lines = 200
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub command: CommandSection,

    #[serde(default)]
    pub queue: QueueSection,

    #[serde(default)]
    pub log: LogSection,
}

/// Validated configuration. Build it from a [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub command: CommandSection,
    pub queue: QueueSection,
    pub log: LogSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        command: CommandSection,
        queue: QueueSection,
        log: LogSection,
    ) -> Self {
        Self {
            command,
            queue,
            log,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            CommandSection::default(),
            QueueSection::default(),
            LogSection::default(),
        )
    }
}

/// `[command]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    /// Leading part of every command line: the executable and its constant
    /// flags. Whitespace separated, no shell quoting.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_string()
}

impl Default for CommandSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// `[queue]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSection {
    /// Maximum number of pending tasks.
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// `"reject"` (default) or `"wait"`.
    #[serde(default)]
    pub on_full: FullQueuePolicy,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            on_full: FullQueuePolicy::default(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    /// Number of log lines kept; older lines are dropped first.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LOG_LINES
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
        }
    }
}
