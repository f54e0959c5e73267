// crates/test-utils/src/builders.rs

#![allow(dead_code)]

use cmdqueue::config::{ConfigFile, RawConfigFile};
use cmdqueue::engine::QueueSettings;
use cmdqueue::types::FullQueuePolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.command.prefix = prefix.to_string();
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.queue.capacity = capacity;
        self
    }

    pub fn on_full(mut self, policy: FullQueuePolicy) -> Self {
        self.config.queue.on_full = policy;
        self
    }

    pub fn max_log_lines(mut self, lines: usize) -> Self {
        self.config.log.max_lines = lines;
        self
    }

    /// The raw model, for tests that exercise validation themselves.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    pub fn settings(self) -> QueueSettings {
        QueueSettings::from(&self.build())
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
