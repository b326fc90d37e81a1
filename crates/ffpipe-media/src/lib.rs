#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for media processing.
//!
//! This crate provides:
//! - Typed FFmpeg arguments collected in a keyed container
//! - A builder that renders the container in a fixed protocol order
//! - Process supervision with cooperative stop and output validation
//! - Progress parsing from the FFmpeg status line
//! - Recipes (convert, snapshot, join, audio and stream operations)

pub mod argument;
pub mod builder;
pub mod command;
pub mod config;
pub mod container;
pub mod diagnostics;
pub mod error;
pub mod fs_utils;
pub mod metrics;
pub mod probe;
pub mod progress;
pub mod recipes;
pub mod validation;

pub use argument::{Argument, ArgumentKind, InputSource, Placement};
pub use builder::{build_args, command_line};
pub use command::{cancel_channel, check_ffmpeg, FfmpegRunner, RunReport, RunState, StopHandle};
pub use config::FfmpegOptions;
pub use container::ArgumentContainer;
pub use diagnostics::DiagnosticBuffer;
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use progress::{ProgressCallback, ProgressMonitor};
pub use recipes::ConvertOptions;
