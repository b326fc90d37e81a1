//! Encoding presets and defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::ParseEnumError;

/// Default video bitrate used by the conversion recipes (kbit/s).
pub const DEFAULT_VIDEO_BITRATE_KBPS: u32 = 2400;
/// Default frame rate for image sequences.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;
/// Zero-padding width of image sequence file names (`%09d`).
pub const IMAGE_SEQUENCE_DIGITS: usize = 9;

/// Audio bitrate presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AudioQuality {
    Ultra,
    Hd,
    #[default]
    Normal,
    Low,
}

impl AudioQuality {
    /// Bitrate in kbit/s.
    pub fn bitrate_kbps(&self) -> u32 {
        match self {
            AudioQuality::Ultra => 384,
            AudioQuality::Hd => 192,
            AudioQuality::Normal => 128,
            AudioQuality::Low => 64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioQuality::Ultra => "ultra",
            AudioQuality::Hd => "hd",
            AudioQuality::Normal => "normal",
            AudioQuality::Low => "low",
        }
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioQuality {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ultra" => Ok(AudioQuality::Ultra),
            "hd" => Ok(AudioQuality::Hd),
            "normal" => Ok(AudioQuality::Normal),
            "low" => Ok(AudioQuality::Low),
            _ => Err(ParseEnumError::new("audio quality", s)),
        }
    }
}

/// Encoder speed preset. Faster presets trade quality for time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    VerySlow,
    Slower,
    Slow,
    Medium,
    Fast,
    Faster,
    VeryFast,
    #[default]
    SuperFast,
    UltraFast,
}

impl Speed {
    pub const ALL: &'static [Speed] = &[
        Speed::VerySlow,
        Speed::Slower,
        Speed::Slow,
        Speed::Medium,
        Speed::Fast,
        Speed::Faster,
        Speed::VeryFast,
        Speed::SuperFast,
        Speed::UltraFast,
    ];

    /// Preset name as passed to `-preset`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Speed::VerySlow => "veryslow",
            Speed::Slower => "slower",
            Speed::Slow => "slow",
            Speed::Medium => "medium",
            Speed::Fast => "fast",
            Speed::Faster => "faster",
            Speed::VeryFast => "veryfast",
            Speed::SuperFast => "superfast",
            Speed::UltraFast => "ultrafast",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Speed {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Speed::ALL
            .iter()
            .copied()
            .find(|speed| speed.as_str() == lower)
            .ok_or_else(|| ParseEnumError::new("speed preset", s))
    }
}

/// Target output height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoSize {
    FullHd,
    Hd,
    Ed,
    Ld,
    #[default]
    Original,
}

impl VideoSize {
    /// Output height in pixels, `None` to keep the source height.
    pub fn height(&self) -> Option<u32> {
        match self {
            VideoSize::FullHd => Some(1080),
            VideoSize::Hd => Some(720),
            VideoSize::Ed => Some(480),
            VideoSize::Ld => Some(360),
            VideoSize::Original => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSize::FullHd => "full_hd",
            VideoSize::Hd => "hd",
            VideoSize::Ed => "ed",
            VideoSize::Ld => "ld",
            VideoSize::Original => "original",
        }
    }
}

impl fmt::Display for VideoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoSize {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_hd" | "1080" | "1080p" => Ok(VideoSize::FullHd),
            "hd" | "720" | "720p" => Ok(VideoSize::Hd),
            "ed" | "480" | "480p" => Ok(VideoSize::Ed),
            "ld" | "360" | "360p" => Ok(VideoSize::Ld),
            "original" => Ok(VideoSize::Original),
            _ => Err(ParseEnumError::new("video size", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_quality_bitrates() {
        assert_eq!(AudioQuality::Ultra.bitrate_kbps(), 384);
        assert_eq!(AudioQuality::Hd.bitrate_kbps(), 192);
        assert_eq!(AudioQuality::default().bitrate_kbps(), 128);
        assert_eq!(AudioQuality::Low.bitrate_kbps(), 64);
    }

    #[test]
    fn test_speed_parse() {
        assert_eq!("SuperFast".parse::<Speed>().unwrap(), Speed::SuperFast);
        assert_eq!(Speed::VeryFast.to_string(), "veryfast");
        assert!("ludicrous".parse::<Speed>().is_err());
    }

    #[test]
    fn test_video_size_heights() {
        assert_eq!(VideoSize::FullHd.height(), Some(1080));
        assert_eq!(VideoSize::Original.height(), None);
        assert_eq!("720p".parse::<VideoSize>().unwrap(), VideoSize::Hd);
    }
}
