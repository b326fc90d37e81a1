//! Joining videos and image sequences.

use std::path::{Path, PathBuf};

use ffpipe_models::encoding::IMAGE_SEQUENCE_DIGITS;
use ffpipe_models::format::extension;
use ffpipe_models::{Channel, Filter, VideoCodec, VideoType};
use tracing::{debug, info};

use super::convert::{convert, ConvertOptions};
use crate::argument::Argument;
use crate::command::{FfmpegRunner, RunReport};
use crate::container::ArgumentContainer;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::TemporaryFiles;
use crate::probe::VideoInfo;
use crate::validation::{ensure_absent, ensure_encodable, ensure_exists};

/// Concatenate `videos` into `output`.
///
/// Each video is first remuxed to an MPEG-TS intermediate next to its
/// source, one at a time. The intermediates are then joined with stream copy
/// and removed whether or not the join succeeds.
pub async fn join(
    runner: &FfmpegRunner,
    output: &Path,
    videos: &[VideoInfo],
) -> MediaResult<RunReport> {
    if videos.is_empty() {
        return Err(MediaError::InvalidVideo("no videos to join".to_string()));
    }
    ensure_absent(output)?;
    ensure_exists(videos.iter().map(|v| &v.path))?;

    let mut parts = TemporaryFiles::new();
    for (index, video) in videos.iter().enumerate() {
        ensure_encodable(video)?;

        let part = intermediate_path(&video.path, index);
        ensure_absent(&part)?;
        parts.track(&part);

        debug!("Remuxing {} to {}", video.path.display(), part.display());
        let options = ConvertOptions {
            video_type: VideoType::Ts,
            ..Default::default()
        };
        let report = convert(runner, video, &part, options, None).await?;
        if report.cancelled {
            return Err(MediaError::Cancelled(format!(
                "join stopped while preparing {}",
                video.path.display()
            )));
        }
    }

    info!("Joining {} videos into {}", videos.len(), output.display());
    let container = join_arguments(parts.paths(), output);
    let result = runner.run(&container).await;
    parts.cleanup();
    result
}

/// Arguments for the final concatenation step of [`join`].
pub fn join_arguments(parts: &[PathBuf], output: &Path) -> ArgumentContainer {
    ArgumentContainer::new()
        .with(Argument::concat(parts))
        .with(Argument::Copy(Channel::Both))
        .with(Argument::BitstreamFilter {
            channel: Channel::Audio,
            filter: Filter::AacAdtsToAsc,
        })
        .with(Argument::output(output))
}

fn intermediate_path(source: &Path, index: usize) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    source.with_file_name(format!("{}.part{}{}", stem, index, extension::TS))
}

/// Encode `images` as consecutive frames of an H.264 video.
///
/// All images must share the extension of the first one, whose dimensions
/// set the frame size. They are copied into a scratch directory as a
/// zero-padded numbered sequence, which is removed afterwards.
pub async fn join_image_sequence(
    runner: &FfmpegRunner,
    output: &Path,
    frame_rate: f64,
    images: &[VideoInfo],
) -> MediaResult<RunReport> {
    let first = images
        .first()
        .ok_or_else(|| MediaError::InvalidVideo("no images to join".to_string()))?;
    ensure_absent(output)?;
    ensure_exists(images.iter().map(|i| &i.path))?;

    let image_extension = first.extension();
    for image in images {
        ensure_encodable(image)?;
        if image.extension() != image_extension {
            return Err(MediaError::UnsupportedFormat(format!(
                "{} does not match the sequence extension {}",
                image.path.display(),
                image_extension
            )));
        }
    }

    let frames = tempfile::Builder::new()
        .prefix("ffpipe-frames-")
        .tempdir_in(runner.options().temp_dir())?;
    for (index, image) in images.iter().enumerate() {
        let frame = frames
            .path()
            .join(sequence_file_name(index, &image_extension));
        tokio::fs::copy(&image.path, &frame).await?;
    }
    debug!(
        "Copied {} frames into {}",
        images.len(),
        frames.path().display()
    );

    let container = image_sequence_arguments(
        frames.path(),
        &image_extension,
        first,
        frame_rate,
        images.len(),
        output,
    );
    runner.run(&container).await
}

/// Arguments for [`join_image_sequence`] once frames are in `frames_dir`.
pub fn image_sequence_arguments(
    frames_dir: &Path,
    image_extension: &str,
    first: &VideoInfo,
    frame_rate: f64,
    frame_count: usize,
    output: &Path,
) -> ArgumentContainer {
    let pattern = frames_dir.join(format!("%0{}d{}", IMAGE_SEQUENCE_DIGITS, image_extension));

    ArgumentContainer::new()
        .with(Argument::FrameRate(frame_rate))
        .with(Argument::Size {
            width: first.width,
            height: first.height,
        })
        .with(Argument::StartNumber(0))
        .with(Argument::input(pattern))
        .with(Argument::FrameOutputCount(frame_count as u32))
        .with(Argument::video_codec(VideoCodec::LibX264))
        .with(Argument::output(output))
}

fn sequence_file_name(index: usize, image_extension: &str) -> String {
    format!(
        "{:0width$}{}",
        index,
        image_extension,
        width = IMAGE_SEQUENCE_DIGITS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_args;
    use crate::recipes::test_support::video;

    #[test]
    fn test_join_arguments() {
        let parts = vec![PathBuf::from("/v/a.part0.ts"), PathBuf::from("/v/b.part1.ts")];
        let args = build_args(&join_arguments(&parts, Path::new("/v/joined.mp4"))).unwrap();
        assert_eq!(
            args,
            [
                "-i",
                "concat:/v/a.part0.ts|/v/b.part1.ts",
                "-c",
                "copy",
                "-bsf:a",
                "aac_adtstoasc",
                "/v/joined.mp4"
            ]
        );
    }

    #[test]
    fn test_intermediate_path_stays_next_to_source() {
        assert_eq!(
            intermediate_path(Path::new("/videos/clip.mp4"), 3),
            PathBuf::from("/videos/clip.part3.ts")
        );
        assert_eq!(
            intermediate_path(Path::new("/videos/clip.ts"), 0),
            PathBuf::from("/videos/clip.part0.ts")
        );
    }

    #[test]
    fn test_image_sequence_arguments() {
        let first = video(Path::new("/img/a.png"), 640, 480, 0.0);
        let container = image_sequence_arguments(
            Path::new("/tmp/frames"),
            ".png",
            &first,
            30.0,
            3,
            Path::new("/out/seq.mp4"),
        );

        let args = build_args(&container).unwrap();
        assert_eq!(
            args,
            [
                "-r",
                "30",
                "-start_number",
                "0",
                "-i",
                "/tmp/frames/%09d.png",
                "-c:v",
                "libx264",
                "-s",
                "640x480",
                "-vframes",
                "3",
                "/out/seq.mp4"
            ]
        );
    }

    #[test]
    fn test_sequence_file_name() {
        assert_eq!(sequence_file_name(0, ".png"), "000000000.png");
        assert_eq!(sequence_file_name(42, ".jpg"), "000000042.jpg");
    }

    #[tokio::test]
    async fn test_join_requires_videos() {
        let runner = FfmpegRunner::default();
        let err = join(&runner, Path::new("/tmp/none.mp4"), &[]).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidVideo(_)));

        let err = join_image_sequence(&runner, Path::new("/tmp/none.mp4"), 30.0, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidVideo(_)));
    }

    #[tokio::test]
    async fn test_image_sequence_rejects_mixed_extensions() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = dir.path().join("a.png");
        let jpg = dir.path().join("b.jpg");
        std::fs::write(&png, b"png").unwrap();
        std::fs::write(&jpg, b"jpg").unwrap();
        let images = [video(&png, 64, 64, 0.0), video(&jpg, 64, 64, 0.0)];

        let err = join_image_sequence(
            &FfmpegRunner::default(),
            &dir.path().join("seq.mp4"),
            30.0,
            &images,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFormat(_)));
    }
}
