// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default, validate_config};
use crate::console::Console;
use crate::engine::{CommandProcessor, QueueHandle, QueueSettings};
use crate::exec::SubprocessRunner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - the queue handle and the command processor
/// - the console adapter
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))
        .context("loading configuration")?;
    let cfg = apply_overrides(cfg, &args);
    validate_config(&cfg)?;

    let settings = QueueSettings::from(&cfg);

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let handle = QueueHandle::new(&settings);
    let processor = CommandProcessor::new(handle.clone(), SubprocessRunner::new());
    let processor_task = tokio::spawn(processor.run());

    // Ctrl-C → graceful shutdown.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            handle.shutdown();
        });
    }

    let mut console = Console::start(handle.clone())?;
    console.run_input().await;

    // Kills the process in flight, if any, and stops the processor loop.
    handle.shutdown();

    processor_task
        .await
        .map_err(|e| anyhow!("command processor task failed: {e}"))??;

    console.finish().await;
    info!("exited cleanly");
    Ok(())
}

/// CLI flags win over the config file.
fn apply_overrides(mut cfg: ConfigFile, args: &CliArgs) -> ConfigFile {
    if let Some(ref prefix) = args.cmd {
        cfg.command.prefix = prefix.clone();
    }
    if let Some(capacity) = args.queue_capacity {
        cfg.queue.capacity = capacity;
    }
    if let Some(lines) = args.max_log_lines {
        cfg.log.max_lines = lines;
    }
    if let Some(policy) = args.on_full {
        cfg.queue.on_full = policy;
    }
    cfg
}

/// Simple dry-run output: print the effective settings.
fn print_dry_run(settings: &QueueSettings) {
    println!("cmdqueue dry-run");
    println!("  command.prefix = {}", settings.prefix);
    println!("  queue.capacity = {}", settings.queue_capacity);
    println!("  queue.on_full = {}", settings.on_full);
    println!("  log.max_lines = {}", settings.max_log_lines);

    debug!("dry-run complete (no execution)");
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::types::FullQueuePolicy;

    #[test]
    fn cli_overrides_config_values() {
        let args = CliArgs::try_parse_from([
            "cmdqueue",
            "--cmd",
            "echo",
            "--max-log-lines",
            "7",
            "--on-full",
            "wait",
        ])
        .unwrap();

        let cfg = apply_overrides(ConfigFile::default(), &args);
        let settings = QueueSettings::from(&cfg);

        assert_eq!(settings.prefix, "echo");
        assert_eq!(settings.max_log_lines, 7);
        assert_eq!(settings.queue_capacity, 100);
        assert_eq!(settings.on_full, FullQueuePolicy::Wait);
    }

    #[test]
    fn zero_capacity_override_is_caught() {
        let args = CliArgs::try_parse_from(["cmdqueue", "--queue-capacity", "0"]).unwrap();
        let cfg = apply_overrides(ConfigFile::default(), &args);
        assert!(validate_config(&cfg).is_err());
    }
}
