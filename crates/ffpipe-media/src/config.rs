//! FFmpeg binary configuration.

use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

const FFMPEG: &str = "ffmpeg";
const FFPROBE: &str = "ffprobe";

/// Where to find the FFmpeg tools and where recipes put scratch files.
#[derive(Debug, Clone, Default)]
pub struct FfmpegOptions {
    /// Directory containing both `ffmpeg` and `ffprobe`
    pub root_directory: Option<PathBuf>,
    /// Explicit `ffmpeg` binary (takes precedence over the root directory)
    pub ffmpeg_binary: Option<PathBuf>,
    /// Explicit `ffprobe` binary (takes precedence over the root directory)
    pub ffprobe_binary: Option<PathBuf>,
    /// Directory for intermediate files; system temp dir when unset
    pub temp_directory: Option<PathBuf>,
}

impl FfmpegOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from environment variables.
    pub fn from_env() -> Self {
        Self {
            root_directory: env_path("FFPIPE_FFMPEG_ROOT"),
            ffmpeg_binary: env_path("FFPIPE_FFMPEG_BINARY"),
            ffprobe_binary: env_path("FFPIPE_FFPROBE_BINARY"),
            temp_directory: env_path("FFPIPE_TEMP_DIR"),
        }
    }

    pub fn with_root_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_directory = Some(dir.into());
        self
    }

    pub fn with_ffmpeg_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_binary = Some(path.into());
        self
    }

    pub fn with_ffprobe_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_binary = Some(path.into());
        self
    }

    pub fn with_temp_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_directory = Some(dir.into());
        self
    }

    /// Resolve the `ffmpeg` executable.
    pub fn ffmpeg_path(&self) -> MediaResult<PathBuf> {
        resolve(self.ffmpeg_binary.as_deref(), self.root_directory.as_deref(), FFMPEG)
            .ok_or(MediaError::FfmpegNotFound)
    }

    /// Resolve the `ffprobe` executable.
    pub fn ffprobe_path(&self) -> MediaResult<PathBuf> {
        resolve(self.ffprobe_binary.as_deref(), self.root_directory.as_deref(), FFPROBE)
            .ok_or(MediaError::FfprobeNotFound)
    }

    /// Directory for intermediate files.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Explicit binary wins as-is; a missing file then surfaces at launch.
fn resolve(explicit: Option<&Path>, root: Option<&Path>, name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(root) = root {
        return Some(root.join(executable_name(name)));
    }
    which::which(name).ok()
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}
