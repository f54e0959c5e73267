// src/config/validate.rs

use tracing::warn;

use crate::config::model::{CommandSection, ConfigFile, LogSection, QueueSection, RawConfigFile};
use crate::errors::{CmdQueueError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CmdQueueError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.command, raw.queue, raw.log))
    }
}

/// Check the invariants a usable queue needs.
///
/// Also used by the binary after CLI overrides have been applied, since a
/// flag like `--queue-capacity 0` bypasses the file-level check.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    check_sections(&cfg.command, &cfg.queue, &cfg.log)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    check_sections(&cfg.command, &cfg.queue, &cfg.log)
}

fn check_sections(command: &CommandSection, queue: &QueueSection, log: &LogSection) -> Result<()> {
    ensure_capacities(queue.capacity, log.max_lines)?;
    warn_on_blank_prefix(&command.prefix);
    Ok(())
}

fn ensure_capacities(queue_capacity: usize, max_log_lines: usize) -> Result<()> {
    if queue_capacity == 0 {
        return Err(CmdQueueError::ConfigError(
            "[queue].capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    if max_log_lines == 0 {
        return Err(CmdQueueError::ConfigError(
            "[log].max_lines must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

// A blank prefix is still accepted: every task will be resolved with
// InvalidCommand, and submissions may carry their own prefix.
fn warn_on_blank_prefix(prefix: &str) {
    if prefix.trim().is_empty() {
        warn!("[command].prefix is empty; tasks without their own prefix will fail");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let raw = RawConfigFile {
            queue: QueueSection {
                capacity: 0,
                ..QueueSection::default()
            },
            ..RawConfigFile::default()
        };

        match ConfigFile::try_from(raw) {
            Err(CmdQueueError::ConfigError(msg)) => assert!(msg.contains("[queue].capacity")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn zero_log_lines_is_rejected() {
        let raw = RawConfigFile {
            log: LogSection { max_lines: 0 },
            ..RawConfigFile::default()
        };

        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(CmdQueueError::ConfigError(_))
        ));
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.queue.capacity, 100);
        assert_eq!(cfg.log.max_lines, 200);
        assert!(validate_config(&cfg).is_ok());
    }
}
