//! Transcoding, snapshots and poster videos.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ffpipe_models::encoding::DEFAULT_VIDEO_BITRATE_KBPS;
use ffpipe_models::format::extension;
use ffpipe_models::{
    AudioCodec, AudioQuality, Channel, EncoderType, Filter, HardwareAccel, Speed, VideoCodec,
    VideoSize, VideoType,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{scaled_dimensions, snapshot_dimensions};
use crate::argument::Argument;
use crate::command::{FfmpegRunner, RunReport};
use crate::container::ArgumentContainer;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::with_extension;
use crate::probe::VideoInfo;
use crate::progress::ProgressCallback;
use crate::validation::{
    ensure_absent, ensure_conversion, ensure_encodable, ensure_exists, ensure_extension,
};

/// Conversion settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    pub encoder: EncoderType,
    pub video_type: VideoType,
    pub speed: Speed,
    pub size: VideoSize,
    pub audio_quality: AudioQuality,
    /// Use every core for software encoding
    pub multithreaded: bool,
}

/// Convert `source` to `output`, reporting progress against the source
/// duration.
pub async fn convert(
    runner: &FfmpegRunner,
    source: &VideoInfo,
    output: &Path,
    options: ConvertOptions,
    progress: Option<ProgressCallback>,
) -> MediaResult<RunReport> {
    let container = convert_arguments(source, output, &options)?;

    info!(
        "Converting {} to {} ({}, {})",
        source.path.display(),
        output.display(),
        options.encoder.as_str(),
        options.video_type.as_str()
    );

    match progress {
        Some(callback) => {
            runner
                .run_with_progress(&container, source.duration(), callback)
                .await
        }
        None => runner.run(&container).await,
    }
}

/// Arguments for [`convert`].
pub fn convert_arguments(
    source: &VideoInfo,
    output: &Path,
    options: &ConvertOptions,
) -> MediaResult<ArgumentContainer> {
    ensure_conversion(&source.path, output)?;
    ensure_extension(output, options.video_type.extension())?;
    ensure_encodable(source)?;

    let (width, height) = scaled_dimensions(source, options.size);
    let scale = Argument::Scale { width, height };
    let audio = |codec| Argument::audio_codec(codec, options.audio_quality);

    let container = match (options.encoder, options.video_type) {
        (EncoderType::Software, VideoType::Mp4) => ArgumentContainer::new()
            .with(Argument::input(&source.path))
            .with(Argument::threads(options.multithreaded))
            .with(scale)
            .with(Argument::video_codec_with_bitrate(
                VideoCodec::LibX264,
                DEFAULT_VIDEO_BITRATE_KBPS,
            ))
            .with(Argument::Speed(options.speed))
            .with(audio(AudioCodec::Aac))
            .with(Argument::output(output)),
        (EncoderType::Software, VideoType::Ogv) => ArgumentContainer::new()
            .with(Argument::input(&source.path))
            .with(Argument::threads(options.multithreaded))
            .with(scale)
            .with(Argument::video_codec_with_bitrate(
                VideoCodec::LibTheora,
                DEFAULT_VIDEO_BITRATE_KBPS,
            ))
            .with(Argument::Speed(options.speed))
            .with(audio(AudioCodec::LibVorbis))
            .with(Argument::output(output)),
        (EncoderType::Software, VideoType::Ts) => ArgumentContainer::new()
            .with(Argument::input(&source.path))
            .with(Argument::Copy(Channel::Both))
            .with(Argument::BitstreamFilter {
                channel: Channel::Video,
                filter: Filter::H264Mp4ToAnnexB,
            })
            .with(Argument::ForceFormat(VideoCodec::MpegTs))
            .with(Argument::output(output)),
        (EncoderType::HardwareNvidia, VideoType::Mp4) => ArgumentContainer::new()
            .with(Argument::HwAccel(HardwareAccel::Cuvid))
            .with(Argument::input(&source.path))
            .with(Argument::NvidiaVideoCodec {
                codec: VideoCodec::H264Nvenc,
                bitrate: Some(DEFAULT_VIDEO_BITRATE_KBPS),
            })
            .with(Argument::threads(false))
            .with(scale)
            .with(audio(AudioCodec::Aac))
            .with(Argument::output(output)),
        (EncoderType::HardwareIntel, VideoType::Mp4) => ArgumentContainer::new()
            .with(Argument::input(&source.path))
            .with(Argument::IntelVideoCodec {
                codec: VideoCodec::H264Qsv,
                bitrate: Some(DEFAULT_VIDEO_BITRATE_KBPS),
            })
            .with(Argument::threads(false))
            .with(scale)
            .with(audio(AudioCodec::Aac))
            .with(Argument::output(output)),
        (encoder, video_type) => {
            return Err(MediaError::UnsupportedFormat(format!(
                "{} output is not supported by the {} encoder",
                video_type.as_str(),
                encoder.as_str()
            )))
        }
    };

    Ok(container)
}

/// Capture one PNG frame of `source`.
///
/// A non-`.png` output gets its extension replaced. `capture_time` defaults
/// to a third of the duration.
pub async fn snapshot(
    runner: &FfmpegRunner,
    source: &VideoInfo,
    output: &Path,
    size: Option<(u32, u32)>,
    capture_time: Option<Duration>,
) -> MediaResult<RunReport> {
    let container = snapshot_arguments(source, output, size, capture_time)?;
    runner.run(&container).await
}

/// Arguments for [`snapshot`].
pub fn snapshot_arguments(
    source: &VideoInfo,
    output: &Path,
    size: Option<(u32, u32)>,
    capture_time: Option<Duration>,
) -> MediaResult<ArgumentContainer> {
    let output = png_path(output);
    ensure_conversion(&source.path, &output)?;

    let capture_time = capture_time.unwrap_or_else(|| source.duration() / 3);
    let (width, height) = snapshot_dimensions(source, size);

    Ok(ArgumentContainer::new()
        .with(Argument::input(&source.path))
        .with(Argument::video_codec(VideoCodec::Png))
        .with(Argument::FrameOutputCount(1))
        .with(Argument::Seek(capture_time))
        .with(Argument::Size { width, height })
        .with(Argument::output(output)))
}

fn png_path(output: &Path) -> PathBuf {
    if ensure_extension(output, extension::PNG).is_ok() {
        output.to_path_buf()
    } else {
        with_extension(output, extension::PNG)
    }
}

/// Loop a still `image` over `audio` into an MP4.
pub async fn poster_with_audio(
    runner: &FfmpegRunner,
    image: &VideoInfo,
    audio: &Path,
    output: &Path,
) -> MediaResult<RunReport> {
    let container = poster_arguments(image, audio, output)?;
    runner.run(&container).await
}

/// Arguments for [`poster_with_audio`].
pub fn poster_arguments(
    image: &VideoInfo,
    audio: &Path,
    output: &Path,
) -> MediaResult<ArgumentContainer> {
    ensure_exists([image.path.as_path(), audio])?;
    ensure_absent(output)?;
    ensure_extension(output, extension::MP4)?;
    ensure_encodable(image)?;

    Ok(ArgumentContainer::new()
        .with(Argument::Loop(1))
        .with(Argument::input_with_audio(&image.path, audio))
        .with(Argument::video_codec_with_bitrate(
            VideoCodec::LibX264,
            DEFAULT_VIDEO_BITRATE_KBPS,
        ))
        .with(Argument::audio_codec(AudioCodec::Aac, AudioQuality::Normal))
        .with(Argument::Shortest(true))
        .with(Argument::output(output)))
}
