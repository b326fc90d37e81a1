//! Metrics for FFmpeg invocations.
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the embedding application.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const FFMPEG_RUNS_TOTAL: &str = "ffpipe_ffmpeg_runs_total";
    pub const FFMPEG_DURATION_SECONDS: &str = "ffpipe_ffmpeg_duration_seconds";
}

/// Terminal outcome label of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Cancelled,
    Failed,
    LaunchFailed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Succeeded => "succeeded",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Failed => "failed",
            RunOutcome::LaunchFailed => "launch_failed",
        }
    }
}

/// Record a finished invocation.
pub fn record_run(outcome: RunOutcome, duration_secs: f64) {
    let labels = [("outcome", outcome.as_str())];
    counter!(names::FFMPEG_RUNS_TOTAL, &labels).increment(1);
    histogram!(names::FFMPEG_DURATION_SECONDS, &labels).record(duration_secs);
}
