//! ffpipe command-line front end.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use ffpipe_media::recipes;
use ffpipe_media::{
    cancel_channel, check_ffmpeg, probe_video, ConvertOptions, FfmpegOptions, FfmpegRunner,
    ProgressCallback, RunReport,
};
use ffpipe_models::encoding::DEFAULT_FRAME_RATE;
use ffpipe_models::{AudioQuality, EncoderType, Speed, VideoSize, VideoType};

#[derive(Parser, Debug)]
#[command(name = "ffpipe")]
#[command(about = "Runs common FFmpeg operations with progress and graceful stop")]
struct Cli {
    /// FFmpeg binary (overrides FFPIPE_FFMPEG_BINARY)
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// FFprobe binary (overrides FFPIPE_FFPROBE_BINARY)
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,

    /// Directory containing both tools (overrides FFPIPE_FFMPEG_ROOT)
    #[arg(long, global = true)]
    ffmpeg_root: Option<PathBuf>,

    /// Directory for intermediate files (overrides FFPIPE_TEMP_DIR)
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    /// Kill FFmpeg after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a video to another container or size
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value = "software")]
        encoder: EncoderType,
        #[arg(short = 't', long = "type", default_value = "mp4")]
        video_type: VideoType,
        #[arg(short, long, default_value = "superfast")]
        speed: Speed,
        #[arg(long, default_value = "original")]
        size: VideoSize,
        #[arg(short, long, default_value = "normal")]
        audio_quality: AudioQuality,
        /// Use every core for software encoding
        #[arg(short, long)]
        multithreaded: bool,
    },
    /// Capture a single PNG frame
    Snapshot {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Capture time in seconds (default: a third of the duration)
        #[arg(long)]
        at: Option<f64>,
    },
    /// Drop the audio track
    Mute { input: PathBuf, output: PathBuf },
    /// Write the audio track to an MP3 file
    ExtractAudio { input: PathBuf, output: PathBuf },
    /// Replace the audio track
    ReplaceAudio {
        input: PathBuf,
        audio: PathBuf,
        output: PathBuf,
        /// End with the shorter input
        #[arg(long)]
        shortest: bool,
    },
    /// Concatenate videos
    Join {
        output: PathBuf,
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
    /// Encode still images into a video, one image per frame
    Images {
        output: PathBuf,
        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,
        #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: f64,
    },
    /// Record an HTTP(S) stream
    Stream { uri: Url, output: PathBuf },
}

impl Cli {
    fn ffmpeg_options(&self) -> FfmpegOptions {
        let mut options = FfmpegOptions::from_env();
        if let Some(path) = &self.ffmpeg {
            options = options.with_ffmpeg_binary(path);
        }
        if let Some(path) = &self.ffprobe {
            options = options.with_ffprobe_binary(path);
        }
        if let Some(dir) = &self.ffmpeg_root {
            options = options.with_root_directory(dir);
        }
        if let Some(dir) = &self.temp_dir {
            options = options.with_temp_directory(dir);
        }
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let options = cli.ffmpeg_options();
    let ffmpeg = check_ffmpeg(&options).context("FFmpeg is not available")?;
    info!("Using FFmpeg at {}", ffmpeg.display());

    let (stop, cancel_rx) = cancel_channel();
    let mut runner = FfmpegRunner::new(options).with_cancel(cancel_rx);
    if let Some(secs) = cli.timeout {
        runner = runner.with_timeout(Duration::from_secs(secs));
    }

    // First Ctrl-C asks FFmpeg to finish; the output written so far is kept.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, asking FFmpeg to stop");
            stop.stop();
        }
    });

    let report = execute(cli.command, &runner).await?;
    info!(
        "{} {} ({} bytes, {:.2}s)",
        if report.cancelled { "Stopped early:" } else { "Done:" },
        report.output.display(),
        report.output_size,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for terminals, JSON when LOG_FORMAT=json
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("ffpipe=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn log_progress() -> ProgressCallback {
    Box::new(|percent: f64| info!("Progress: {:.2}%", percent))
}

async fn execute(command: Command, runner: &FfmpegRunner) -> anyhow::Result<RunReport> {
    let options = runner.options();

    let report = match command {
        Command::Convert {
            input,
            output,
            encoder,
            video_type,
            speed,
            size,
            audio_quality,
            multithreaded,
        } => {
            let source = probe_video(options, &input)
                .await
                .with_context(|| format!("Failed to probe {}", input.display()))?;
            let settings = ConvertOptions {
                encoder,
                video_type,
                speed,
                size,
                audio_quality,
                multithreaded,
            };
            recipes::convert(runner, &source, &output, settings, Some(log_progress())).await?
        }
        Command::Snapshot {
            input,
            output,
            width,
            height,
            at,
        } => {
            let source = probe_video(options, &input).await?;
            let size = match (width, height) {
                (None, None) => None,
                (w, h) => Some((w.unwrap_or(0), h.unwrap_or(0))),
            };
            let capture_time = at
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("Invalid capture time")?;
            recipes::snapshot(runner, &source, &output, size, capture_time).await?
        }
        Command::Mute { input, output } => {
            let source = probe_video(options, &input).await?;
            recipes::mute(runner, &source, &output).await?
        }
        Command::ExtractAudio { input, output } => {
            let source = probe_video(options, &input).await?;
            recipes::extract_audio(runner, &source, &output).await?
        }
        Command::ReplaceAudio {
            input,
            audio,
            output,
            shortest,
        } => {
            let source = probe_video(options, &input).await?;
            recipes::replace_audio(runner, &source, &audio, &output, shortest).await?
        }
        Command::Join { output, inputs } => {
            let mut videos = Vec::with_capacity(inputs.len());
            for input in &inputs {
                videos.push(
                    probe_video(options, input)
                        .await
                        .with_context(|| format!("Failed to probe {}", input.display()))?,
                );
            }
            recipes::join(runner, &output, &videos).await?
        }
        Command::Images {
            output,
            images,
            frame_rate,
        } => {
            let mut frames = Vec::with_capacity(images.len());
            for image in &images {
                frames.push(
                    probe_video(options, image)
                        .await
                        .with_context(|| format!("Failed to probe {}", image.display()))?,
                );
            }
            recipes::join_image_sequence(runner, &output, frame_rate, &frames).await?
        }
        Command::Stream { uri, output } => recipes::save_stream(runner, &uri, &output).await?,
    };

    Ok(report)
}
