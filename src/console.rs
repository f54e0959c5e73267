// src/console.rs

//! Line-oriented presentation adapter for the `cmdqueue` binary.
//!
//! Input is read from stdin on a dedicated thread (so a pending read never
//! holds up process exit) and forwarded over a channel. Output is driven by
//! change notifications: every time the shared state changes, log lines
//! appended since the last redraw are printed to stdout.

use std::io::BufRead;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{LineKind, LogLine, QueueHandle};
use crate::errors::CmdQueueError;

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank line; ignored.
    Empty,
    /// `:quit` - stop the application.
    Quit,
    /// `:idle` - queue the idle sentinel.
    Idle,
    /// `:status` - print status, depth and pending items.
    Status,
    /// Anything else: a suffix to queue behind the configured prefix.
    Submit(String),
}

pub fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        ":quit" | ":q" => Input::Quit,
        ":idle" => Input::Idle,
        ":status" | ":s" => Input::Status,
        suffix => Input::Submit(suffix.to_string()),
    }
}

/// How a log line is shown on the console.
pub fn format_line(line: &LogLine) -> String {
    match line.kind {
        LineKind::Stderr => format!("[stderr] {}", line.text),
        _ => line.text.clone(),
    }
}

/// Dashboard text: current command plus the pending listing.
pub fn format_status(handle: &QueueHandle) -> String {
    let pending = handle.pending();
    let mut out = format!(
        "Current CMD:\n{}\n\nQueue ({} pending):\n",
        handle.status(),
        pending.len()
    );

    if pending.is_empty() {
        out.push_str("[Empty]");
    } else {
        for (idx, item) in pending.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&format!("{}. {item}", idx + 1));
        }
    }
    out
}

/// Running console adapter.
#[derive(Debug)]
pub struct Console {
    handle: QueueHandle,
    input: mpsc::Receiver<String>,
    renderer: JoinHandle<()>,
    stop_renderer: oneshot::Sender<()>,
}

impl Console {
    /// Start reading stdin and rendering, then open the ready gate.
    pub fn start(handle: QueueHandle) -> Result<Self> {
        let (line_tx, input) = mpsc::channel::<String>(16);
        spawn_stdin_reader(line_tx)?;

        let (stop_renderer, stop_rx) = oneshot::channel();
        let renderer = tokio::spawn(render_loop(handle.clone(), stop_rx));

        println!(
            "Using command prefix: {}\nType a suffix and press Enter. Commands: :status, :idle, :quit",
            handle.prefix()
        );
        handle.mark_ready();

        Ok(Self {
            handle,
            input,
            renderer,
            stop_renderer,
        })
    }

    /// Handle input until `:quit`, end of stdin, or shutdown.
    pub async fn run_input(&mut self) {
        loop {
            let line = tokio::select! {
                _ = self.handle.shutdown_requested() => break,
                line = self.input.recv() => line,
            };

            let Some(line) = line else {
                info!("stdin closed");
                break;
            };

            match parse_input(&line) {
                Input::Empty => {}
                Input::Quit => break,
                Input::Status => println!("{}", format_status(&self.handle)),
                Input::Idle => report_submit(self.handle.submit_idle().await, "(idle)"),
                Input::Submit(suffix) => {
                    report_submit(self.handle.submit(&suffix).await, &suffix)
                }
            }
        }
    }

    /// Print whatever is left in the log and stop rendering.
    pub async fn finish(self) {
        let _ = self.stop_renderer.send(());
        if let Err(err) = self.renderer.await {
            warn!(error = %err, "console renderer did not finish cleanly");
        }
    }
}

fn report_submit(result: crate::errors::Result<()>, what: &str) {
    match result {
        Ok(()) => println!("Added to queue: {what}"),
        Err(CmdQueueError::QueueFull { capacity }) => {
            println!("Queue full ({capacity} pending); not added: {what}")
        }
        Err(err) => println!("Not added: {err}"),
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> Result<()> {
    std::thread::Builder::new()
        .name("cmdqueue-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to read stdin");
                        break;
                    }
                }
            }
            debug!("stdin reader finished");
        })
        .context("spawning stdin reader thread")?;
    Ok(())
}

async fn render_loop(handle: QueueHandle, mut stop: oneshot::Receiver<()>) {
    let mut changes = handle.subscribe();
    let mut last_seq = 0;

    loop {
        last_seq = print_new_lines(&handle, last_seq);

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut stop => break,
        }
    }

    print_new_lines(&handle, last_seq);
}

fn print_new_lines(handle: &QueueHandle, after: u64) -> u64 {
    let lines = handle.log_lines_after(after);
    let mut last = after;
    for line in &lines {
        println!("{}", format_line(line));
        last = line.seq;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{QueueItem, QueueSettings, Task};

    #[test]
    fn parses_commands_and_suffixes() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input(":quit"), Input::Quit);
        assert_eq!(parse_input(" :idle "), Input::Idle);
        assert_eq!(parse_input(":status"), Input::Status);
        assert_eq!(
            parse_input("  https://example.com/v  "),
            Input::Submit("https://example.com/v".into())
        );
    }

    #[test]
    fn stderr_lines_are_marked() {
        let line = LogLine {
            seq: 1,
            kind: LineKind::Stderr,
            text: "warning".into(),
        };
        assert_eq!(format_line(&line), "[stderr] warning");

        let line = LogLine {
            seq: 2,
            kind: LineKind::Stdout,
            text: "ok".into(),
        };
        assert_eq!(format_line(&line), "ok");
    }

    #[tokio::test]
    async fn status_lists_pending_items() {
        let handle = QueueHandle::new(&QueueSettings {
            prefix: "echo".into(),
            ..QueueSettings::default()
        });
        assert!(format_status(&handle).ends_with("Queue (0 pending):\n[Empty]"));

        handle.submit("a").await.unwrap();
        handle.submit_with_prefix("ls", "-l").await.unwrap();

        let text = format_status(&handle);
        assert!(text.starts_with("Current CMD:\nIdle\n"));
        assert!(text.contains("Queue (2 pending):"));
        assert!(text.contains("1. [echo] a"));
        assert!(text.contains("2. [ls] -l"));
        assert_eq!(
            handle.pending()[0],
            QueueItem::Run(Task::new("echo", "a"))
        );
    }
}
