//! FFmpeg progress parsing.
//!
//! FFmpeg reports progress on stderr as status lines such as
//! `frame=  250 fps= 25 q=28.0 size= 1024kB time=00:00:10.00 bitrate=...`.
//! [`ProgressMonitor`] turns the embedded `HH:MM:SS` timestamp into a
//! percentage of a known target duration.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

/// Substring identifying a status line.
pub const PROGRESS_MARKER: &str = "frame";

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}):(\d{2}):(\d{2})").expect("valid timestamp pattern"));

/// Callback type for progress updates. Receives a percentage.
pub type ProgressCallback = Box<dyn FnMut(f64) + Send + 'static>;

/// Stateful line parser feeding a progress callback.
pub struct ProgressMonitor {
    target: Duration,
    callback: ProgressCallback,
    emitted: u64,
}

impl ProgressMonitor {
    /// Create a monitor normalising against `target`.
    pub fn new<F>(target: Duration, callback: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        Self {
            target,
            callback: Box::new(callback),
            emitted: 0,
        }
    }

    /// Feed one diagnostic line. Returns the percentage if the callback fired.
    pub fn observe(&mut self, line: &str) -> Option<f64> {
        if !line.contains(PROGRESS_MARKER) {
            return None;
        }
        let elapsed = extract_timestamp(line)?;
        let percent = percentage(elapsed, self.target)?;
        self.emitted += 1;
        (self.callback)(percent);
        Some(percent)
    }

    /// Number of callback invocations so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn target(&self) -> Duration {
        self.target
    }
}

impl std::fmt::Debug for ProgressMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressMonitor")
            .field("target", &self.target)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

/// Extract the first valid `HH:MM:SS` timestamp in `line`.
///
/// Candidates with minutes or seconds above 59 are skipped.
pub fn extract_timestamp(line: &str) -> Option<Duration> {
    TIMESTAMP.captures_iter(line).find_map(|caps| {
        let hours: u64 = caps[1].parse().ok()?;
        let minutes: u64 = caps[2].parse().ok()?;
        let seconds: u64 = caps[3].parse().ok()?;
        if minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
    })
}

/// Elapsed time as a percentage of `target`, rounded to two decimals.
///
/// Not clamped: an elapsed time past the target yields more than 100.
/// Returns `None` for a zero target.
pub fn percentage(elapsed: Duration, target: Duration) -> Option<f64> {
    let target = target.as_secs_f64();
    if target <= 0.0 {
        return None;
    }
    let raw = elapsed.as_secs_f64() / target * 100.0;
    Some((raw * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_monitor(target_secs: u64) -> (ProgressMonitor, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let monitor = ProgressMonitor::new(Duration::from_secs(target_secs), move |p| {
            sink.lock().unwrap().push(p)
        });
        (monitor, seen)
    }

    #[test]
    fn test_ten_seconds_of_hundred_is_ten_percent() {
        let (mut monitor, seen) = recording_monitor(100);
        let line = "frame=  250 fps= 25 q=28.0 size=    1024kB time=00:00:10.00 bitrate= 838.9kbits/s";

        assert_eq!(monitor.observe(line), Some(10.0));
        assert_eq!(*seen.lock().unwrap(), vec![10.0]);
        assert_eq!(monitor.emitted(), 1);
    }

    #[test]
    fn test_line_without_marker_is_ignored() {
        let (mut monitor, seen) = recording_monitor(100);
        assert_eq!(monitor.observe("  Duration: 00:01:40.00, start: 0.000000"), None);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_marker_without_timestamp_does_not_fire() {
        let (mut monitor, seen) = recording_monitor(100);
        assert_eq!(monitor.observe("frame=    0 fps=0.0 q=0.0 size=0kB time=N/A"), None);
        assert_eq!(monitor.observe("frame=  1 time=0:00:1.5"), None);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_percentage_is_not_clamped() {
        let (mut monitor, _) = recording_monitor(10);
        assert_eq!(monitor.observe("frame=  500 time=00:00:15.00"), Some(150.0));
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(
            percentage(Duration::from_secs(1), Duration::from_secs(3)),
            Some(33.33)
        );
        assert_eq!(
            percentage(Duration::from_secs(2), Duration::from_secs(3)),
            Some(66.67)
        );
    }

    #[test]
    fn test_zero_target_never_fires() {
        let (mut monitor, seen) = recording_monitor(0);
        assert_eq!(monitor.observe("frame=  10 time=00:00:01.00"), None);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_extract_timestamp() {
        assert_eq!(
            extract_timestamp("time=01:02:03.45"),
            Some(Duration::from_secs(3723))
        );
        assert_eq!(extract_timestamp("time=00:75:00.00"), None);
        assert_eq!(extract_timestamp("no time here"), None);
    }

    #[test]
    fn test_invalid_timestamp_does_not_hide_a_later_one() {
        assert_eq!(
            extract_timestamp("frame= 1 size=99:99:99 time=00:00:10.00"),
            Some(Duration::from_secs(10))
        );

        let (mut monitor, seen) = recording_monitor(20);
        monitor.observe("frame= 2 q=00:61:00 time=00:00:05.00");
        assert_eq!(*seen.lock().unwrap(), vec![25.0]);
    }

    #[test]
    fn test_duplicate_markers_are_reported_again() {
        let (mut monitor, seen) = recording_monitor(20);
        monitor.observe("frame= 1 time=00:00:05.00");
        monitor.observe("frame= 1 time=00:00:05.00");
        monitor.observe("frame= 2 time=00:00:04.00");
        assert_eq!(*seen.lock().unwrap(), vec![25.0, 25.0, 20.0]);
    }
}
