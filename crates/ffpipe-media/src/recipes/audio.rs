//! Audio track operations.

use std::path::Path;

use ffpipe_models::format::extension;
use ffpipe_models::{AudioCodec, AudioQuality, Channel};

use crate::argument::Argument;
use crate::command::{FfmpegRunner, RunReport};
use crate::container::ArgumentContainer;
use crate::error::MediaResult;
use crate::probe::VideoInfo;
use crate::validation::{
    ensure_absent, ensure_conversion, ensure_encodable, ensure_exists, ensure_extension,
};

/// Copy `source` to `output` without its audio track.
pub async fn mute(
    runner: &FfmpegRunner,
    source: &VideoInfo,
    output: &Path,
) -> MediaResult<RunReport> {
    let container = mute_arguments(source, output)?;
    runner.run(&container).await
}

/// Arguments for [`mute`]. The output keeps the source extension.
pub fn mute_arguments(source: &VideoInfo, output: &Path) -> MediaResult<ArgumentContainer> {
    ensure_conversion(&source.path, output)?;
    ensure_extension(output, &source.extension())?;
    ensure_encodable(source)?;

    Ok(ArgumentContainer::new()
        .with(Argument::input(&source.path))
        .with(Argument::Copy(Channel::Both))
        .with(Argument::DisableChannel(Channel::Audio))
        .with(Argument::output(output)))
}

/// Write the audio track of `source` to an MP3 file.
pub async fn extract_audio(
    runner: &FfmpegRunner,
    source: &VideoInfo,
    output: &Path,
) -> MediaResult<RunReport> {
    let container = extract_audio_arguments(source, output)?;
    runner.run(&container).await
}

/// Arguments for [`extract_audio`].
pub fn extract_audio_arguments(
    source: &VideoInfo,
    output: &Path,
) -> MediaResult<ArgumentContainer> {
    ensure_conversion(&source.path, output)?;
    ensure_extension(output, extension::MP3)?;

    Ok(ArgumentContainer::new()
        .with(Argument::input(&source.path))
        .with(Argument::DisableChannel(Channel::Video))
        .with(Argument::output(output)))
}

/// Replace the audio of `source` with `audio`.
///
/// With `stop_at_shortest` the output ends with the shorter of the two
/// inputs.
pub async fn replace_audio(
    runner: &FfmpegRunner,
    source: &VideoInfo,
    audio: &Path,
    output: &Path,
    stop_at_shortest: bool,
) -> MediaResult<RunReport> {
    let container = replace_audio_arguments(source, audio, output, stop_at_shortest)?;
    runner.run(&container).await
}

/// Arguments for [`replace_audio`].
pub fn replace_audio_arguments(
    source: &VideoInfo,
    audio: &Path,
    output: &Path,
    stop_at_shortest: bool,
) -> MediaResult<ArgumentContainer> {
    ensure_exists([source.path.as_path(), audio])?;
    ensure_absent(output)?;
    ensure_extension(output, &source.extension())?;
    ensure_encodable(source)?;

    Ok(ArgumentContainer::new()
        .with(Argument::input_with_audio(&source.path, audio))
        .with(Argument::Copy(Channel::Both))
        .with(Argument::audio_codec(AudioCodec::Aac, AudioQuality::Hd))
        .with(Argument::Shortest(stop_at_shortest))
        .with(Argument::output(output)))
}
