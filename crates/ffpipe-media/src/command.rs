//! FFmpeg process runner with progress tracking and cancellation.
//!
//! One [`FfmpegRunner::run`] call is one invocation:
//!
//! ```text
//! Created -> Launched -> Running -> {Succeeded | Failed | Cancelled} -> Closed
//! ```
//!
//! Success is decided by the output file alone: it must exist and be
//! non-empty once the process has exited, whatever the exit status says.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::builder::{build_args, command_line};
use crate::config::FfmpegOptions;
use crate::container::ArgumentContainer;
use crate::diagnostics::{collect_diagnostics, take_diagnostics, SharedDiagnostics};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::valid_output_size;
use crate::metrics::{record_run, RunOutcome};
use crate::progress::ProgressMonitor;

/// Byte written to FFmpeg's stdin to make it finish gracefully.
pub const QUIT_TOKEN: &[u8] = b"q";

/// How long stderr may keep draining after the process has exited.
///
/// A descendant that inherited stderr can hold it open long after FFmpeg is
/// gone. The reader is abandoned once this elapses.
pub const STDERR_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Lifecycle state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Launched,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Closed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Created => "created",
            RunState::Launched => "launched",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
            RunState::Closed => "closed",
        }
    }
}

/// Result of a successful (or cancelled but usable) invocation.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Output file
    pub output: PathBuf,
    /// Output size in bytes (always > 0)
    pub output_size: u64,
    /// Process exit code, `None` if killed by a signal
    pub exit_code: Option<i32>,
    /// Whether a stop was requested during the run
    pub cancelled: bool,
    /// Wall-clock time from launch to exit
    pub elapsed: Duration,
    /// Terminal state, `Succeeded` or `Cancelled`
    pub state: RunState,
}

/// Requests a cooperative stop of the invocation it is attached to.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Ask FFmpeg to finish. Repeated calls have no further effect.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Create a stop handle and the receiver to pass to
/// [`FfmpegRunner::with_cancel`].
pub fn cancel_channel() -> (StopHandle, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx: Arc::new(tx) }, rx)
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    options: FfmpegOptions,
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Hard limit after which the process is killed
    timeout: Option<Duration>,
}

struct ProcessExit {
    status: ExitStatus,
    cancelled: bool,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new(options: FfmpegOptions) -> Self {
        Self {
            options,
            cancel_rx: None,
            timeout: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Kill the process if it runs longer than `limit`. Off by default.
    ///
    /// The call returns within `limit` plus [`STDERR_DRAIN_GRACE`].
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn options(&self) -> &FfmpegOptions {
        &self.options
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, container: &ArgumentContainer) -> MediaResult<RunReport> {
        self.execute(container, None).await
    }

    /// Run an FFmpeg command, reporting progress against `target`.
    pub async fn run_with_progress<F>(
        &self,
        container: &ArgumentContainer,
        target: Duration,
        progress_callback: F,
    ) -> MediaResult<RunReport>
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.execute(container, Some(ProgressMonitor::new(target, progress_callback)))
            .await
    }

    async fn execute(
        &self,
        container: &ArgumentContainer,
        monitor: Option<ProgressMonitor>,
    ) -> MediaResult<RunReport> {
        let args = build_args(container)?;
        let output = container.output_path()?.to_path_buf();
        let program = self.options.ffmpeg_path()?;

        let mut lifecycle = Lifecycle::new();
        debug!(
            "Running FFmpeg: {}",
            command_line(&program.to_string_lossy(), &args)
        );

        let started = Instant::now();
        let mut child = match Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                lifecycle.fail(RunOutcome::LaunchFailed, started.elapsed());
                return Err(MediaError::LaunchFailed { program, source });
            }
        };
        lifecycle.advance(RunState::Launched);

        let stdin = child.stdin.take();
        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                let _ = child.start_kill();
                lifecycle.fail(RunOutcome::Failed, started.elapsed());
                return Err(MediaError::internal("FFmpeg stderr not captured"));
            }
        };
        let diagnostics = SharedDiagnostics::default();
        let mut reader = tokio::spawn(collect_diagnostics(
            stderr,
            monitor,
            Arc::clone(&diagnostics),
        ));
        lifecycle.advance(RunState::Running);

        let waited = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.wait_for_exit(&mut child, stdin)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            "FFmpeg timed out after {} seconds, killing process",
                            limit.as_secs()
                        );
                        Err(MediaError::Timeout(limit.as_secs()))
                    }
                }
            }
            None => self.wait_for_exit(&mut child, stdin).await,
        };
        if waited.is_err() {
            let _ = child.start_kill();
        }

        match tokio::time::timeout(STDERR_DRAIN_GRACE, &mut reader).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Diagnostic reader failed: {}", e),
            Err(_) => {
                warn!("FFmpeg stderr still open after exit, abandoning reader");
                reader.abort();
            }
        }
        let diagnostics = take_diagnostics(&diagnostics);
        drop(child);
        let elapsed = started.elapsed();

        let exit = match waited {
            Ok(exit) => exit,
            Err(e) => {
                lifecycle.fail(RunOutcome::Failed, elapsed);
                return Err(e);
            }
        };

        let Some(output_size) = valid_output_size(&output).await else {
            lifecycle.fail(RunOutcome::Failed, elapsed);
            warn!(
                "FFmpeg produced no output at {} (exit code {:?})",
                output.display(),
                exit.status.code()
            );
            return Err(MediaError::ffmpeg_failed(
                format!("output {} is missing or empty", output.display()),
                Some(diagnostics.into_text()),
                exit.status.code(),
            ));
        };

        if !exit.status.success() {
            warn!(
                "FFmpeg exited with {} but produced {} ({} bytes)",
                exit.status,
                output.display(),
                output_size
            );
        }

        let (state, outcome) = if exit.cancelled {
            (RunState::Cancelled, RunOutcome::Cancelled)
        } else {
            (RunState::Succeeded, RunOutcome::Succeeded)
        };
        lifecycle.advance(state);
        lifecycle.advance(RunState::Closed);
        record_run(outcome, elapsed.as_secs_f64());

        info!(
            "FFmpeg {}: {} ({} bytes) in {:.2}s",
            state.as_str(),
            output.display(),
            output_size,
            elapsed.as_secs_f64()
        );

        Ok(RunReport {
            output,
            output_size,
            exit_code: exit.status.code(),
            cancelled: exit.cancelled,
            elapsed,
            state,
        })
    }

    /// Wait for the child to exit, relaying at most one stop request.
    async fn wait_for_exit(
        &self,
        child: &mut Child,
        mut stdin: Option<ChildStdin>,
    ) -> MediaResult<ProcessExit> {
        let Some(mut cancel_rx) = self.cancel_rx.clone() else {
            let status = child.wait().await?;
            return Ok(ProcessExit {
                status,
                cancelled: false,
            });
        };

        let stop_requested = tokio::select! {
            status = child.wait() => {
                return Ok(ProcessExit { status: status?, cancelled: false });
            }
            requested = async { cancel_rx.wait_for(|stop| *stop).await.is_ok() } => requested,
        };

        if stop_requested {
            info!("Stop requested, asking FFmpeg to quit");
            send_quit(stdin.take()).await;
        }

        let status = child.wait().await?;
        Ok(ProcessExit {
            status,
            cancelled: stop_requested,
        })
    }
}

/// Write the quit token once and close stdin.
async fn send_quit(stdin: Option<ChildStdin>) {
    let Some(mut stdin) = stdin else {
        warn!("FFmpeg stdin not available, cannot send quit");
        return;
    };
    if let Err(e) = stdin.write_all(QUIT_TOKEN).await {
        warn!("Failed to send quit to FFmpeg: {}", e);
        return;
    }
    if let Err(e) = stdin.flush().await {
        warn!("Failed to flush FFmpeg stdin: {}", e);
    }
}

/// Tracks and logs state transitions of one invocation.
struct Lifecycle {
    state: RunState,
}

impl Lifecycle {
    fn new() -> Self {
        debug!(state = RunState::Created.as_str(), "FFmpeg invocation created");
        Self {
            state: RunState::Created,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(
            from = self.state.as_str(),
            to = next.as_str(),
            "FFmpeg invocation state change"
        );
        self.state = next;
    }

    /// Close a failed invocation and record it.
    fn fail(&mut self, outcome: RunOutcome, elapsed: Duration) {
        self.advance(RunState::Failed);
        self.advance(RunState::Closed);
        record_run(outcome, elapsed.as_secs_f64());
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg(options: &FfmpegOptions) -> MediaResult<PathBuf> {
    let path = options.ffmpeg_path()?;
    if path.is_absolute() && !path.exists() {
        return Err(MediaError::FileNotFound(path));
    }
    Ok(path)
}
