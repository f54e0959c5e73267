// src/exec/task_runner.rs

//! Subprocess runner backed by `tokio::process`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{LineKind, LogBuffer, Shutdown};
use crate::errors::{CmdQueueError, Result};

use super::{CommandLine, ProcessRunner, RunOutcome};

/// How long readers may keep draining after the process was killed.
///
/// A grandchild that inherited the pipes can hold them open past the kill;
/// after this grace period the readers are aborted instead of blocking the
/// processor.
const READER_GRACE: Duration = Duration::from_secs(2);

/// Longest output line accepted before the stream is given up on.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Production runner: spawns the command directly (no shell), with stdin
/// closed and stdout/stderr piped.
#[derive(Debug, Clone, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SubprocessRunner {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandLine,
        log: &'a LogBuffer,
        shutdown: &'a Shutdown,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutcome>> + Send + 'a>> {
        Box::pin(run_command(command, log, shutdown))
    }
}

/// Run a single process, streaming stdout/stderr into `log`.
///
/// - Both streams are drained concurrently by their own Tokio task.
/// - The readers are joined before the exit status is collected, so every
///   output line precedes the caller's completion line.
/// - If `shutdown` fires first, the child is killed and the outcome is
///   [`RunOutcome::Cancelled`].
pub async fn run_command(
    command: &CommandLine,
    log: &LogBuffer,
    shutdown: &Shutdown,
) -> Result<RunOutcome> {
    let mut child = Command::new(command.program())
        .args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CmdQueueError::Launch {
            command: command.to_string(),
            source,
        })?;

    info!(command = %command, pid = ?child.id(), "process started");

    let mut readers = Readers::default();
    if let Some(stdout) = child.stdout.take() {
        readers.spawn(stdout, LineKind::Stdout, log.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        readers.spawn(stderr, LineKind::Stderr, log.clone());
    }

    let cancelled = tokio::select! {
        _ = readers.join() => false,
        _ = shutdown.cancelled() => true,
    };
    if cancelled {
        return Ok(cancel(command, &mut child, &mut readers).await);
    }

    debug!(command = %command, "output streams closed; waiting for exit");

    let status = tokio::select! {
        status = child.wait() => status,
        _ = shutdown.cancelled() => {
            return Ok(cancel(command, &mut child, &mut readers).await);
        }
    };

    let outcome = match status {
        Ok(status) => match status.code() {
            Some(code) => RunOutcome::Exited(code),
            None => RunOutcome::Terminated,
        },
        Err(err) => {
            warn!(command = %command, error = %err, "waiting for process failed");
            RunOutcome::WaitFailed(err.to_string())
        }
    };

    info!(
        command = %command,
        outcome = ?outcome,
        success = outcome.is_success(),
        "process resolved"
    );

    Ok(outcome)
}

async fn cancel(command: &CommandLine, child: &mut Child, readers: &mut Readers) -> RunOutcome {
    info!(command = %command, "shutdown requested; killing process");

    if let Err(err) = child.start_kill() {
        debug!(command = %command, error = %err, "kill failed; process may have exited already");
    }

    if tokio::time::timeout(READER_GRACE, readers.join()).await.is_err() {
        warn!(command = %command, "output readers still blocked after kill; aborting them");
        readers.abort();
    }

    if let Err(err) = child.wait().await {
        warn!(command = %command, error = %err, "failed to reap killed process");
    }

    RunOutcome::Cancelled
}

/// The stream-reader tasks of one process.
#[derive(Debug, Default)]
struct Readers {
    handles: Vec<JoinHandle<()>>,
}

impl Readers {
    fn spawn<R>(&mut self, stream: R, kind: LineKind, log: LogBuffer)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.handles
            .push(tokio::spawn(drain_stream(stream, kind, log)));
    }

    /// Wait for every reader. Cancel-safe: finished readers are removed as
    /// soon as they complete, so a later call resumes with the rest.
    async fn join(&mut self) {
        while let Some(handle) = self.handles.last_mut() {
            if let Err(err) = handle.await {
                debug!(error = %err, "output reader task did not complete");
            }
            self.handles.pop();
        }
    }

    fn abort(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

/// Read `stream` line by line into `log` until end-of-stream.
///
/// A read error, or a line longer than [`MAX_LINE_BYTES`], is logged as a
/// warning and ends this reader only; the other stream and the exit wait
/// carry on. Dropping the pipe then lets a still-writing child fail with
/// `EPIPE` instead of blocking.
async fn drain_stream<R>(stream: R, kind: LineKind, log: LogBuffer)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut lines = 0usize;

    loop {
        buf.clear();
        match read_line(&mut reader, &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                log.append(kind, decode_line(&buf));
                lines += 1;
            }
            Err(err) => {
                warn!(stream = stream_name(kind), error = %err, "stream read error");
                log.append(
                    LineKind::Warning,
                    format!("{} read error: {err}", stream_name(kind)),
                );
                break;
            }
        }
    }

    debug!(stream = stream_name(kind), lines, "stream reached end");
}

/// Read one line into `buf`, failing once it grows past [`MAX_LINE_BYTES`]
/// without a newline.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_LINE_BYTES as u64 + 1;
    let n = reader.take(limit).read_until(b'\n', buf).await?;
    if buf.len() > MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("line longer than {MAX_LINE_BYTES} bytes"),
        ));
    }
    Ok(n)
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn stream_name(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Stderr => "Stderr",
        _ => "Stdout",
    }
}

#[cfg(test)]
mod tests {
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;
    use crate::engine::ChangeNotifier;

    #[test]
    fn decode_strips_terminators() {
        assert_eq!(decode_line(b"hello\n"), "hello");
        assert_eq!(decode_line(b"dos\r\n"), "dos");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"\n"), "");
    }

    #[test]
    fn decode_replaces_invalid_utf8() {
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
    }

    #[tokio::test]
    async fn drain_splits_on_newlines() {
        let log = LogBuffer::new(10, ChangeNotifier::new());
        let input: &[u8] = b"one\ntwo\r\nthree";

        drain_stream(input, LineKind::Stderr, log.clone()).await;

        let snap = log.snapshot();
        let texts: Vec<&str> = snap.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
        assert!(snap.iter().all(|l| l.kind == LineKind::Stderr));
    }

    /// Yields one line, then fails every read.
    struct BrokenPipe {
        sent: bool,
    }

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let this = self.get_mut();
            if this.sent {
                return Poll::Ready(Err(std::io::Error::other("pipe broke")));
            }
            this.sent = true;
            buf.put_slice(b"first\n");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn read_error_becomes_a_warning_line() {
        let log = LogBuffer::new(10, ChangeNotifier::new());

        tokio::time::timeout(
            Duration::from_secs(5),
            drain_stream(BrokenPipe { sent: false }, LineKind::Stdout, log.clone()),
        )
        .await
        .expect("reader should stop after the error");

        let snap = log.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!((snap[0].kind, snap[0].text.as_str()), (LineKind::Stdout, "first"));
        assert_eq!(snap[1].kind, LineKind::Warning);
        assert_eq!(snap[1].text, "Stdout read error: pipe broke");
    }

    #[tokio::test]
    async fn overlong_line_stops_the_reader() {
        let log = LogBuffer::new(10, ChangeNotifier::new());
        let mut input = b"short\n".to_vec();
        input.extend(std::iter::repeat_n(b'x', MAX_LINE_BYTES + 10));
        input.extend_from_slice(b"\nafter\n");

        drain_stream(input.as_slice(), LineKind::Stderr, log.clone()).await;

        let snap = log.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].text, "short");
        assert_eq!(snap[1].kind, LineKind::Warning);
        assert_eq!(
            snap[1].text,
            format!("Stderr read error: line longer than {MAX_LINE_BYTES} bytes")
        );
    }

    #[tokio::test]
    async fn line_of_exactly_the_limit_is_kept() {
        let log = LogBuffer::new(10, ChangeNotifier::new());
        let mut input = vec![b'y'; MAX_LINE_BYTES];
        input.push(b'\n');

        drain_stream(input.as_slice(), LineKind::Stdout, log.clone()).await;

        let snap = log.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].text.len(), MAX_LINE_BYTES);
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let log = LogBuffer::new(10, ChangeNotifier::new());
        let shutdown = Shutdown::new();
        let command = CommandLine::assemble("cmdqueue-definitely-not-a-real-binary", "x").unwrap();

        match run_command(&command, &log, &shutdown).await {
            Err(CmdQueueError::Launch { command, .. }) => {
                assert_eq!(command, "cmdqueue-definitely-not-a-real-binary x");
            }
            other => panic!("expected Launch error, got {other:?}"),
        }
        assert!(log.is_empty());
    }
}
