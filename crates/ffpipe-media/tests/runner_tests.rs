//! Runner and recipe tests against shell-script stand-ins for ffmpeg/ffprobe.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ffpipe_media::recipes::{convert, join};
use ffpipe_media::{
    cancel_channel, probe_video, Argument, ArgumentContainer, ConvertOptions, FfmpegOptions,
    FfmpegRunner, MediaError, RunState, VideoInfo,
};
use tempfile::TempDir;

/// Write an executable script. `$last` holds the final argument (the output).
fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let script = format!("#!/bin/sh\nfor last; do :; done\n{}\n", body);
    std::fs::write(&path, script).expect("Failed to write fake tool");
    let mut permissions = std::fs::metadata(&path)
        .expect("Failed to stat fake tool")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).expect("Failed to chmod fake tool");
    path
}

fn runner_with(dir: &Path, body: &str) -> FfmpegRunner {
    let ffmpeg = fake_tool(dir, "ffmpeg", body);
    FfmpegRunner::new(FfmpegOptions::new().with_ffmpeg_binary(ffmpeg))
}

fn transcode(dir: &Path) -> ArgumentContainer {
    ArgumentContainer::new()
        .with(Argument::input(dir.join("in.mp4")))
        .with(Argument::output(dir.join("out.mp4")))
}

/// Progress lines are reported as percentages of the target duration.
#[tokio::test]
async fn test_run_reports_progress_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(
        dir.path(),
        r#"printf 'ffmpeg version fake\n' >&2
printf 'frame=   1 fps=0 time=00:00:05.00 bitrate=1.0kbits/s\r' >&2
printf 'frame=   2 fps=0 time=00:00:10.00 bitrate=1.0kbits/s\r' >&2
printf 'data' > "$last""#,
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let report = runner
        .run_with_progress(&transcode(dir.path()), Duration::from_secs(10), move |p| {
            sink.lock().unwrap().push(p)
        })
        .await
        .expect("run should succeed");

    assert_eq!(*seen.lock().unwrap(), vec![50.0, 100.0]);
    assert_eq!(report.state, RunState::Succeeded);
    assert_eq!(report.output, dir.path().join("out.mp4"));
    assert_eq!(report.output_size, 4);
    assert_eq!(report.exit_code, Some(0));
    assert!(!report.cancelled);
}

/// A zero exit status without an output file is still a failure.
#[tokio::test]
async fn test_missing_output_fails_with_diagnostics() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(
        dir.path(),
        "echo 'Unknown encoder' >&2\necho 'Conversion failed!' >&2\nexit 0",
    );

    let err = runner.run(&transcode(dir.path())).await.unwrap_err();
    assert!(err.is_process_failure());
    assert_eq!(err.diagnostics(), Some("Unknown encoder\nConversion failed!"));
    match err {
        MediaError::FfmpegFailed { exit_code, .. } => assert_eq!(exit_code, Some(0)),
        other => panic!("unexpected error: {:?}", other),
    }
}

/// An empty output file counts as missing.
#[tokio::test]
async fn test_empty_output_fails() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(dir.path(), r#": > "$last""#);

    let err = runner.run(&transcode(dir.path())).await.unwrap_err();
    assert!(err.is_process_failure());
}

/// A non-zero exit status does not fail a run that produced output.
#[tokio::test]
async fn test_nonzero_exit_with_output_succeeds() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(dir.path(), "printf 'x' > \"$last\"\nexit 1");

    let report = runner
        .run(&transcode(dir.path()))
        .await
        .expect("output exists");
    assert_eq!(report.exit_code, Some(1));
    assert_eq!(report.state, RunState::Succeeded);
}

/// Stopping writes the quit token once, then lets the tool finish on its own.
#[tokio::test]
async fn test_stop_sends_quit_token_once() {
    let dir = TempDir::new().unwrap();
    let (handle, cancel_rx) = cancel_channel();
    // Echo stdin into the output once it is closed.
    let runner = runner_with(dir.path(), r#"input=$(cat)
printf '%s' "$input" > "$last""#)
    .with_cancel(cancel_rx);

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop();
        handle.stop();
    });

    let report = runner
        .run(&transcode(dir.path()))
        .await
        .expect("cancelled run keeps its output");
    stopper.await.unwrap();

    let written = std::fs::read(dir.path().join("out.mp4")).unwrap();
    assert_eq!(written, b"q");
    assert!(report.cancelled);
    assert_eq!(report.state, RunState::Cancelled);
}

/// The timeout kills a process that never exits.
#[tokio::test]
async fn test_timeout_kills_process() {
    let dir = TempDir::new().unwrap();
    let runner =
        runner_with(dir.path(), "exec sleep 30").with_timeout(Duration::from_millis(200));

    let err = runner.run(&transcode(dir.path())).await.unwrap_err();
    assert!(matches!(err, MediaError::Timeout(_)));
}

/// A stop that makes the tool quit without output is a process failure.
#[tokio::test]
async fn test_stop_without_output_fails_with_diagnostics() {
    let dir = TempDir::new().unwrap();
    let (handle, cancel_rx) = cancel_channel();
    let runner = runner_with(
        dir.path(),
        r#"input=$(cat)
echo "Exiting on request: $input" >&2
exit 255"#,
    )
    .with_cancel(cancel_rx);

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop();
    });

    let err = runner.run(&transcode(dir.path())).await.unwrap_err();
    stopper.await.unwrap();

    assert!(err.is_process_failure());
    assert_eq!(err.diagnostics(), Some("Exiting on request: q"));
    match err {
        MediaError::FfmpegFailed { exit_code, .. } => assert_eq!(exit_code, Some(255)),
        other => panic!("unexpected error: {:?}", other),
    }
}

/// A stop requested after the tool has exited changes nothing.
#[tokio::test]
async fn test_stop_after_exit_keeps_normal_result() {
    let dir = TempDir::new().unwrap();
    let (handle, cancel_rx) = cancel_channel();
    let runner = runner_with(dir.path(), r#"printf 'done' > "$last""#).with_cancel(cancel_rx);

    let report = runner
        .run(&transcode(dir.path()))
        .await
        .expect("run should succeed");
    handle.stop();

    assert!(!report.cancelled);
    assert_eq!(report.state, RunState::Succeeded);
    assert_eq!(std::fs::read(dir.path().join("out.mp4")).unwrap(), b"done");
}

/// A helper that inherits stderr does not keep the run alive.
#[tokio::test]
async fn test_run_returns_when_tool_exits_before_its_children() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(
        dir.path(),
        r#"sleep 5 &
echo 'Output written' >&2
printf 'x' > "$last""#,
    );

    let started = Instant::now();
    let report = runner
        .run(&transcode(dir.path()))
        .await
        .expect("run should succeed");

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.state, RunState::Succeeded);
}

/// The timeout bounds the call even when a child keeps stderr open.
#[tokio::test]
async fn test_timeout_is_enforced_with_lingering_children() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(
        dir.path(),
        r#"sleep 10 &
echo 'Press [q] to stop' >&2
sleep 10"#,
    )
    .with_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let err = runner.run(&transcode(dir.path())).await.unwrap_err();

    assert!(matches!(err, MediaError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
}

/// Probing parses the JSON emitted by ffprobe.
#[tokio::test]
async fn test_probe_with_fake_ffprobe() {
    let dir = TempDir::new().unwrap();
    let ffprobe = fake_tool(
        dir.path(),
        "ffprobe",
        r#"cat <<'EOF'
{"streams":[{"codec_type":"video","codec_name":"h264","width":640,"height":360,"avg_frame_rate":"30/1"}],
 "format":{"duration":"12.5","size":"1000","bit_rate":"640"}}
EOF"#,
    );
    let media = dir.path().join("clip.mp4");
    std::fs::write(&media, b"video").unwrap();

    let options = FfmpegOptions::new().with_ffprobe_binary(ffprobe);
    let info = probe_video(&options, &media).await.expect("probe succeeds");
    assert_eq!((info.width, info.height), (640, 360));
    assert_eq!(info.duration(), Duration::from_millis(12_500));
}

fn video(path: PathBuf, duration: f64) -> VideoInfo {
    std::fs::write(&path, b"video").unwrap();
    VideoInfo {
        path,
        duration,
        width: 640,
        height: 360,
        fps: 30.0,
        codec: "h264".to_string(),
        size: 5,
        bitrate: 0,
    }
}

/// Conversion reports progress against the source duration.
#[tokio::test]
async fn test_convert_recipe_progress() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(
        dir.path(),
        r#"printf 'frame=  10 time=00:00:20.00\r' >&2
printf 'mp4' > "$last""#,
    );
    let source = video(dir.path().join("source.mp4"), 80.0);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let report = convert(
        &runner,
        &source,
        &dir.path().join("converted.mp4"),
        ConvertOptions::default(),
        Some(Box::new(move |p: f64| sink.lock().unwrap().push(p))),
    )
    .await
    .expect("convert succeeds");

    assert_eq!(report.output_size, 3);
    assert_eq!(*seen.lock().unwrap(), vec![25.0]);
}

/// Joining removes its intermediates.
#[tokio::test]
async fn test_join_cleans_up_intermediates() {
    let dir = TempDir::new().unwrap();
    let runner = runner_with(dir.path(), r#"printf 'joined' > "$last""#);
    let videos = [
        video(dir.path().join("a.mp4"), 5.0),
        video(dir.path().join("b.mp4"), 5.0),
    ];
    let output = dir.path().join("joined.mp4");

    let report = join(&runner, &output, &videos).await.expect("join succeeds");

    assert_eq!(report.output, output);
    assert!(!dir.path().join("a.part0.ts").exists());
    assert!(!dir.path().join("b.part1.ts").exists());
}

/// A failed join still removes its intermediates.
#[tokio::test]
async fn test_failed_join_cleans_up_intermediates() {
    let dir = TempDir::new().unwrap();
    // Only the intermediate (.ts) steps produce output.
    let runner = runner_with(
        dir.path(),
        r#"case "$last" in
  *.ts) printf 'ts' > "$last" ;;
  *) echo 'concat failed' >&2 ;;
esac"#,
    );
    let videos = [
        video(dir.path().join("a.mp4"), 5.0),
        video(dir.path().join("b.mp4"), 5.0),
    ];

    let err = join(&runner, &dir.path().join("joined.mp4"), &videos)
        .await
        .unwrap_err();

    assert_eq!(err.diagnostics(), Some("concat failed"));
    assert!(!dir.path().join("a.part0.ts").exists());
    assert!(!dir.path().join("b.part1.ts").exists());
}
