// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdQueueError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The command prefix tokenized to nothing, so there is no executable.
    #[error("command prefix '{0}' is empty or invalid")]
    InvalidCommand(String),

    /// The OS refused to start the process.
    #[error("failed to start '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Queue is full ({capacity} pending)")]
    QueueFull { capacity: usize },

    #[error("Queue is closed; the command processor is shutting down")]
    QueueClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdQueueError>;
