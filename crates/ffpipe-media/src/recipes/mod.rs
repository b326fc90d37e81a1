//! Ready-made FFmpeg operations composed from typed arguments.
//!
//! Every recipe validates its inputs first, assembles an
//! [`ArgumentContainer`](crate::container::ArgumentContainer) and hands it to
//! the supplied [`FfmpegRunner`](crate::command::FfmpegRunner). Sources are
//! described by a probed [`VideoInfo`](crate::probe::VideoInfo).

mod audio;
mod convert;
mod join;
mod stream;

pub use audio::{
    extract_audio, extract_audio_arguments, mute, mute_arguments, replace_audio,
    replace_audio_arguments,
};
pub use convert::{
    convert, convert_arguments, poster_arguments, poster_with_audio, snapshot, snapshot_arguments,
    ConvertOptions,
};
pub use join::{image_sequence_arguments, join, join_arguments, join_image_sequence};
pub use stream::{save_stream, stream_arguments};

use crate::probe::VideoInfo;
use ffpipe_models::VideoSize;

/// Output dimensions for `size`, keeping the source aspect ratio.
///
/// The width is rounded up to an even number since most encoders reject odd
/// widths.
pub fn scaled_dimensions(source: &VideoInfo, size: VideoSize) -> (u32, u32) {
    let (mut width, height) = match size.height() {
        Some(target) if source.height > 0 => {
            let scale = f64::from(source.height) / f64::from(target);
            (
                (f64::from(source.width) / scale) as u32,
                (f64::from(source.height) / scale) as u32,
            )
        }
        _ => (source.width, source.height),
    };

    if width % 2 != 0 {
        width += 1;
    }
    (width, height)
}

/// Fill in a zero side of `requested` from the source aspect ratio.
///
/// `None` or `(0, 0)` means the source size.
pub fn snapshot_dimensions(source: &VideoInfo, requested: Option<(u32, u32)>) -> (u32, u32) {
    match requested {
        None | Some((0, 0)) => (source.width, source.height),
        Some((0, height)) if source.height > 0 => {
            let width = u64::from(height) * u64::from(source.width) / u64::from(source.height);
            (width as u32, height)
        }
        Some((width, 0)) if source.width > 0 => {
            let height = u64::from(width) * u64::from(source.height) / u64::from(source.width);
            (width, height as u32)
        }
        Some(size) => size,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::probe::VideoInfo;
    use std::path::Path;

    pub fn video(path: &Path, width: u32, height: u32, duration: f64) -> VideoInfo {
        VideoInfo {
            path: path.to_path_buf(),
            duration,
            width,
            height,
            fps: 30.0,
            codec: "h264".to_string(),
            size: 1024,
            bitrate: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::video;
    use super::*;
    use std::path::Path;

    #[test]
    fn test_scaled_dimensions() {
        let source = video(Path::new("in.mp4"), 1920, 1080, 10.0);
        assert_eq!(scaled_dimensions(&source, VideoSize::Original), (1920, 1080));
        assert_eq!(scaled_dimensions(&source, VideoSize::Hd), (1280, 720));
        assert_eq!(scaled_dimensions(&source, VideoSize::Ld), (640, 360));
    }

    #[test]
    fn test_scaled_width_is_even() {
        let source = video(Path::new("in.mp4"), 853, 480, 10.0);
        assert_eq!(scaled_dimensions(&source, VideoSize::Original), (854, 480));
    }

    #[test]
    fn test_snapshot_dimensions() {
        let source = video(Path::new("in.mp4"), 1920, 1080, 10.0);
        assert_eq!(snapshot_dimensions(&source, None), (1920, 1080));
        assert_eq!(snapshot_dimensions(&source, Some((0, 0))), (1920, 1080));
        assert_eq!(snapshot_dimensions(&source, Some((0, 540))), (960, 540));
        assert_eq!(snapshot_dimensions(&source, Some((640, 0))), (640, 360));
        assert_eq!(snapshot_dimensions(&source, Some((100, 100))), (100, 100));
    }
}
