//! Output container types and encoder paths.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::ParseEnumError;

/// File extensions the recipes produce or expect (with leading dot).
pub mod extension {
    pub const MP4: &str = ".mp4";
    pub const OGV: &str = ".ogv";
    pub const TS: &str = ".ts";
    pub const PNG: &str = ".png";
    pub const MP3: &str = ".mp3";
}

/// Target container for conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoType {
    #[default]
    Mp4,
    Ogv,
    Ts,
}

impl VideoType {
    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            VideoType::Mp4 => extension::MP4,
            VideoType::Ogv => extension::OGV,
            VideoType::Ts => extension::TS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Mp4 => "mp4",
            VideoType::Ogv => "ogv",
            VideoType::Ts => "ts",
        }
    }
}

impl fmt::Display for VideoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "mp4" => Ok(VideoType::Mp4),
            "ogv" => Ok(VideoType::Ogv),
            "ts" => Ok(VideoType::Ts),
            _ => Err(ParseEnumError::new("video type", s)),
        }
    }
}

/// Which encoder path a conversion uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EncoderType {
    #[default]
    Software,
    HardwareNvidia,
    HardwareIntel,
}

impl EncoderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderType::Software => "software",
            EncoderType::HardwareNvidia => "hardware_nvidia",
            EncoderType::HardwareIntel => "hardware_intel",
        }
    }

    /// Whether encoding is offloaded to a GPU vendor encoder.
    pub fn is_hardware(&self) -> bool {
        !matches!(self, EncoderType::Software)
    }
}

impl fmt::Display for EncoderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EncoderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "software" | "cpu" => Ok(EncoderType::Software),
            "hardware_nvidia" | "nvidia" | "nvenc" => Ok(EncoderType::HardwareNvidia),
            "hardware_intel" | "intel" | "qsv" => Ok(EncoderType::HardwareIntel),
            _ => Err(ParseEnumError::new("encoder type", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_type_extension() {
        assert_eq!(VideoType::Mp4.extension(), ".mp4");
        assert_eq!(VideoType::Ts.extension(), ".ts");
        assert_eq!(".OGV".parse::<VideoType>().unwrap(), VideoType::Ogv);
    }

    #[test]
    fn test_encoder_type_aliases() {
        assert_eq!("nvenc".parse::<EncoderType>().unwrap(), EncoderType::HardwareNvidia);
        assert_eq!("qsv".parse::<EncoderType>().unwrap(), EncoderType::HardwareIntel);
        assert!(!EncoderType::Software.is_hardware());
        assert!(EncoderType::HardwareIntel.is_hardware());
    }
}
