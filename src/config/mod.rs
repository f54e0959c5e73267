// src/config/mod.rs

//! Configuration loading and validation for cmdqueue.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like non-zero capacities (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{CommandSection, ConfigFile, LogSection, QueueSection, RawConfigFile};
pub use validate::validate_config;
