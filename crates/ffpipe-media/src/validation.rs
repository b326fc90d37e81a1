//! Pre-flight checks shared by the recipes.

use std::path::Path;

use crate::error::{MediaError, MediaResult};
use crate::probe::VideoInfo;

/// Smallest width or height FFmpeg can encode.
pub const MIN_DIMENSION: u32 = 3;

/// Fail unless every path exists.
pub fn ensure_exists<I, P>(paths: I) -> MediaResult<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Fail if the output already exists.
pub fn ensure_absent(path: &Path) -> MediaResult<()> {
    if path.exists() {
        return Err(MediaError::FileAlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

/// Fail unless `path` ends with `expected` (leading dot optional, case-insensitive).
pub fn ensure_extension(path: &Path, expected: &str) -> MediaResult<()> {
    let expected = expected.trim_start_matches('.');
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        Err(MediaError::InvalidExtension {
            path: path.to_path_buf(),
            expected: format!(".{}", expected),
        })
    }
}

/// Fail if the source is too small to encode.
pub fn ensure_encodable(info: &VideoInfo) -> MediaResult<()> {
    if info.width < MIN_DIMENSION || info.height < MIN_DIMENSION {
        return Err(MediaError::InvalidVideo(format!(
            "{} is {}x{}, smaller than {}x{}",
            info.path.display(),
            info.width,
            info.height,
            MIN_DIMENSION,
            MIN_DIMENSION
        )));
    }
    Ok(())
}

/// Input must exist and the output must not.
pub fn ensure_conversion(source: &Path, output: &Path) -> MediaResult<()> {
    ensure_exists([source])?;
    ensure_absent(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn info(width: u32, height: u32) -> VideoInfo {
        VideoInfo {
            path: PathBuf::from("clip.mp4"),
            duration: 1.0,
            width,
            height,
            fps: 30.0,
            codec: "h264".to_string(),
            size: 1,
            bitrate: 1,
        }
    }

    #[test]
    fn test_exists_and_absent() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.mp4");
        std::fs::write(&present, b"x").unwrap();
        let missing = dir.path().join("missing.mp4");

        assert!(ensure_exists([&present]).is_ok());
        assert!(matches!(
            ensure_exists([&present, &missing]),
            Err(MediaError::FileNotFound(p)) if p == missing
        ));
        assert!(ensure_absent(&missing).is_ok());
        assert!(matches!(
            ensure_absent(&present),
            Err(MediaError::FileAlreadyExists(_))
        ));
        assert!(ensure_conversion(&present, &missing).is_ok());
    }

    #[test]
    fn test_extension() {
        assert!(ensure_extension(Path::new("out.mp4"), ".mp4").is_ok());
        assert!(ensure_extension(Path::new("OUT.MP4"), "mp4").is_ok());
        let err = ensure_extension(Path::new("out.avi"), ".mp4").unwrap_err();
        assert_eq!(err.to_string(), "Invalid extension for out.avi: expected .mp4");
        assert!(ensure_extension(Path::new("out"), ".mp4").is_err());
    }

    #[test]
    fn test_encodable() {
        assert!(ensure_encodable(&info(640, 480)).is_ok());
        assert!(ensure_encodable(&info(2, 480)).is_err());
        assert!(ensure_encodable(&info(640, 0)).is_err());
    }
}
