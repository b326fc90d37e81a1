//! Diagnostic text captured from the FFmpeg stderr stream.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{trace, warn};

use crate::progress::ProgressMonitor;

const READ_CHUNK: usize = 4096;

/// Append-only lines of stderr output for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticBuffer {
    lines: Vec<String>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> &[String] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }

    /// Full text, one line per entry.
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

/// Diagnostics shared between the stderr reader task and the supervisor.
pub type SharedDiagnostics = Arc<Mutex<DiagnosticBuffer>>;

/// Move the lines collected so far out of `sink`.
pub fn take_diagnostics(sink: &SharedDiagnostics) -> DiagnosticBuffer {
    std::mem::take(&mut *sink.lock().unwrap_or_else(PoisonError::into_inner))
}

/// Incremental splitter for raw stderr bytes.
///
/// FFmpeg redraws its status line with `\r`, so `\r`, `\n` and `\r\n` all end
/// a line. Line content is kept verbatim, including whitespace and blank
/// lines. A `\r\n` pair split across two reads still ends a single line.
#[derive(Debug, Default)]
pub(crate) struct LineSplitter {
    partial: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    /// Feed `bytes`, returning every line they complete.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            match byte {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\r' | b'\n' => {
                    lines.push(String::from_utf8_lossy(&self.partial).into_owned());
                    self.partial.clear();
                    self.after_cr = byte == b'\r';
                }
                _ => {
                    self.partial.push(byte);
                    self.after_cr = false;
                }
            }
        }
        lines
    }

    /// Unterminated text left at the end of the stream.
    pub(crate) fn finish(self) -> Option<String> {
        (!self.partial.is_empty()).then(|| String::from_utf8_lossy(&self.partial).into_owned())
    }
}

/// Consume `stream` to its end and return every line read.
pub async fn read_diagnostics<R>(stream: R, monitor: Option<ProgressMonitor>) -> DiagnosticBuffer
where
    R: AsyncRead + Unpin,
{
    let sink = SharedDiagnostics::default();
    collect_diagnostics(stream, monitor, Arc::clone(&sink)).await;
    take_diagnostics(&sink)
}

/// Consume `stream` to its end, one line at a time.
///
/// Every line is appended to `sink` in arrival order and, when a monitor is
/// supplied, fed to it first. Lines already appended stay in `sink` if the
/// task running this future is aborted. Read errors end the stream.
pub async fn collect_diagnostics<R>(
    mut stream: R,
    mut monitor: Option<ProgressMonitor>,
    sink: SharedDiagnostics,
) where
    R: AsyncRead + Unpin,
{
    let mut splitter = LineSplitter::default();
    let mut chunk = [0u8; READ_CHUNK];

    let mut accept = |line: String| {
        trace!(target: "ffpipe::ffmpeg", "{}", line);
        if let Some(monitor) = monitor.as_mut() {
            monitor.observe(&line);
        }
        sink.lock().unwrap_or_else(PoisonError::into_inner).push(line);
    };

    loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("Failed to read FFmpeg diagnostics: {}", e);
                break;
            }
        };
        for line in splitter.push(&chunk[..read]) {
            accept(line);
        }
    }

    if let Some(line) = splitter.finish() {
        accept(line);
    }
}
