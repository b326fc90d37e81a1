//! Recording remote streams.

use std::path::Path;

use ffpipe_models::format::extension;
use tracing::info;
use url::Url;

use crate::argument::Argument;
use crate::command::{FfmpegRunner, RunReport};
use crate::container::ArgumentContainer;
use crate::error::{MediaError, MediaResult};
use crate::validation::{ensure_absent, ensure_extension};

/// Record an HTTP(S) stream such as an M3U8 playlist into an MP4.
///
/// Live streams run until they end or the runner's stop handle fires.
pub async fn save_stream(runner: &FfmpegRunner, uri: &Url, output: &Path) -> MediaResult<RunReport> {
    let container = stream_arguments(uri, output)?;
    info!("Recording {} to {}", uri, output.display());
    runner.run(&container).await
}

/// Arguments for [`save_stream`].
pub fn stream_arguments(uri: &Url, output: &Path) -> MediaResult<ArgumentContainer> {
    ensure_extension(output, extension::MP4)?;
    ensure_absent(output)?;

    if !matches!(uri.scheme(), "http" | "https") {
        return Err(MediaError::InvalidUri(format!(
            "{} does not point to an http(s) stream",
            uri
        )));
    }

    Ok(ArgumentContainer::new()
        .with(Argument::input_uri(uri.clone()))
        .with(Argument::output(output)))
}
