// src/exec/command.rs

//! Assembling a concrete command line from a prefix and a suffix.
//!
//! Both parts are split on whitespace independently and concatenated, prefix
//! tokens first. There is no shell involved, so quotes and escapes are passed
//! through to the program verbatim.

use std::fmt;

use crate::errors::{CmdQueueError, Result};

/// A tokenized command: the executable name plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Build a command line from `prefix` and `suffix`.
    ///
    /// Fails with [`CmdQueueError::InvalidCommand`] when the prefix contains
    /// no tokens, since then there is no executable to start. An empty suffix
    /// is fine and contributes no arguments.
    pub fn assemble(prefix: &str, suffix: &str) -> Result<Self> {
        let mut prefix_parts = prefix.split_whitespace();
        let program = prefix_parts
            .next()
            .ok_or_else(|| CmdQueueError::InvalidCommand(prefix.to_string()))?
            .to_string();

        let args = prefix_parts
            .chain(suffix.split_whitespace())
            .map(str::to_string)
            .collect();

        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// The command line as shown to users: tokens joined by single spaces.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
