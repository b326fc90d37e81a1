//! Shared data models for ffpipe.
//!
//! This crate provides Serde-serializable types for:
//! - Video and audio codecs, channels and bitstream filters
//! - Encoding presets (audio quality, speed, output size)
//! - Container types and encoder paths

pub mod codec;
pub mod encoding;
pub mod format;

// Re-export common types
pub use codec::{AudioCodec, Channel, Filter, HardwareAccel, ParseEnumError, VideoCodec};
pub use encoding::{AudioQuality, Speed, VideoSize};
pub use format::{EncoderType, VideoType};
