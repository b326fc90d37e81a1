//! Filesystem helpers for output validation and intermediate-file cleanup.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Size of the output artifact, or `None` if it is missing, not a regular
/// file, or empty.
///
/// This is the only success check applied to an FFmpeg run: the tool often
/// reports failures on stderr alone while exiting with status zero.
pub async fn valid_output_size(path: impl AsRef<Path>) -> Option<u64> {
    match fs::metadata(path.as_ref()).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Some(meta.len()),
        _ => None,
    }
}

/// Intermediate files removed when the guard is dropped.
///
/// Removal happens on every exit path, including early returns through `?`
/// and panics unwinding through the owner.
#[derive(Debug, Default)]
pub struct TemporaryFiles {
    paths: Vec<PathBuf>,
}

impl TemporaryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for removal.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove every tracked file now.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!("Removed temporary file: {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    "Failed to remove temporary file {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

impl Drop for TemporaryFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Replace the extension of `path`, keeping its directory and stem.
///
/// `extension` may include the leading dot.
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension.trim_start_matches('.'))
}
