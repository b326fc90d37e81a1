//! Codec, channel and bitstream filter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a model enum cannot be parsed from its tool name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Video codecs understood by the argument model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    LibX264,
    LibVpx,
    LibTheora,
    Png,
    MpegTs,
    H264Nvenc,
    H264Qsv,
    /// NVIDIA hardware decoder. A software codec argument carrying this value
    /// is rendered on the hardware path instead.
    H264Cuvid,
}

impl VideoCodec {
    pub const ALL: &'static [VideoCodec] = &[
        VideoCodec::LibX264,
        VideoCodec::LibVpx,
        VideoCodec::LibTheora,
        VideoCodec::Png,
        VideoCodec::MpegTs,
        VideoCodec::H264Nvenc,
        VideoCodec::H264Qsv,
        VideoCodec::H264Cuvid,
    ];

    /// Name as passed to the tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::LibX264 => "libx264",
            VideoCodec::LibVpx => "libvpx",
            VideoCodec::LibTheora => "libtheora",
            VideoCodec::Png => "png",
            VideoCodec::MpegTs => "mpegts",
            VideoCodec::H264Nvenc => "h264_nvenc",
            VideoCodec::H264Qsv => "h264_qsv",
            VideoCodec::H264Cuvid => "h264_cuvid",
        }
    }

    /// Whether this codec is the hardware sentinel that forces the
    /// hardware rendering path.
    pub fn is_hardware_sentinel(&self) -> bool {
        matches!(self, VideoCodec::H264Cuvid)
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoCodec {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        VideoCodec::ALL
            .iter()
            .copied()
            .find(|codec| codec.as_str() == lower)
            .ok_or_else(|| ParseEnumError::new("video codec", s))
    }
}

/// Audio codecs understood by the argument model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    Aac,
    LibVorbis,
}

impl AudioCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::LibVorbis => "libvorbis",
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioCodec {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aac" => Ok(AudioCodec::Aac),
            "libvorbis" => Ok(AudioCodec::LibVorbis),
            _ => Err(ParseEnumError::new("audio codec", s)),
        }
    }
}

/// Bitstream filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    H264Mp4ToAnnexB,
    AacAdtsToAsc,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::H264Mp4ToAnnexB => "h264_mp4toannexb",
            Filter::AacAdtsToAsc => "aac_adtstoasc",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h264_mp4toannexb" => Ok(Filter::H264Mp4ToAnnexB),
            "aac_adtstoasc" => Ok(Filter::AacAdtsToAsc),
            _ => Err(ParseEnumError::new("bitstream filter", s)),
        }
    }
}

/// Stream channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Audio,
    Video,
    #[default]
    Both,
}

impl Channel {
    /// Stream specifier suffix (`:a`, `:v`, or empty for both).
    pub fn specifier(&self) -> &'static str {
        match self {
            Channel::Audio => ":a",
            Channel::Video => ":v",
            Channel::Both => "",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Audio => "audio",
            Channel::Video => "video",
            Channel::Both => "both",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" | "a" => Ok(Channel::Audio),
            "video" | "v" => Ok(Channel::Video),
            "both" => Ok(Channel::Both),
            _ => Err(ParseEnumError::new("channel", s)),
        }
    }
}

/// Hardware acceleration method placed before the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HardwareAccel {
    #[default]
    Cuvid,
    Cuda,
    Qsv,
}

impl HardwareAccel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HardwareAccel::Cuvid => "cuvid",
            HardwareAccel::Cuda => "cuda",
            HardwareAccel::Qsv => "qsv",
        }
    }
}

impl fmt::Display for HardwareAccel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HardwareAccel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cuvid" => Ok(HardwareAccel::Cuvid),
            "cuda" => Ok(HardwareAccel::Cuda),
            "qsv" => Ok(HardwareAccel::Qsv),
            _ => Err(ParseEnumError::new("hardware acceleration", s)),
        }
    }
}
