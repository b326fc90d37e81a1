//! Typed FFmpeg arguments.
//!
//! Each [`Argument`] renders one fragment of the command line. Variants are a
//! closed set: the [`ArgumentKind`] of a variant keys it inside an
//! [`ArgumentContainer`](crate::container::ArgumentContainer), and the
//! declaration order of `ArgumentKind` is the order in which the builder
//! emits arguments.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ffpipe_models::{AudioCodec, AudioQuality, Channel, Filter, HardwareAccel, Speed, VideoCodec};
use url::Url;

/// Discriminant of an [`Argument`]. A container holds at most one argument
/// per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgumentKind {
    HwAccel,
    HardwareVideoCodec,
    Loop,
    FrameRate,
    StartNumber,
    Input,
    Concat,
    Copy,
    DisableChannel,
    VideoCodec,
    NvidiaVideoCodec,
    IntelVideoCodec,
    AudioCodec,
    BitstreamFilter,
    Threads,
    Speed,
    Scale,
    Size,
    Seek,
    FrameOutputCount,
    Shortest,
    ForceFormat,
    Override,
    Output,
}

impl ArgumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentKind::HwAccel => "hwaccel",
            ArgumentKind::HardwareVideoCodec => "hardware_video_codec",
            ArgumentKind::Loop => "loop",
            ArgumentKind::FrameRate => "frame_rate",
            ArgumentKind::StartNumber => "start_number",
            ArgumentKind::Input => "input",
            ArgumentKind::Concat => "concat",
            ArgumentKind::Copy => "copy",
            ArgumentKind::DisableChannel => "disable_channel",
            ArgumentKind::VideoCodec => "video_codec",
            ArgumentKind::NvidiaVideoCodec => "nvidia_video_codec",
            ArgumentKind::IntelVideoCodec => "intel_video_codec",
            ArgumentKind::AudioCodec => "audio_codec",
            ArgumentKind::BitstreamFilter => "bitstream_filter",
            ArgumentKind::Threads => "threads",
            ArgumentKind::Speed => "speed",
            ArgumentKind::Scale => "scale",
            ArgumentKind::Size => "size",
            ArgumentKind::Seek => "seek",
            ArgumentKind::FrameOutputCount => "frame_output_count",
            ArgumentKind::Shortest => "shortest",
            ArgumentKind::ForceFormat => "force_format",
            ArgumentKind::Override => "override",
            ArgumentKind::Output => "output",
        }
    }

    /// Kinds that only make sense for software encoders.
    pub fn is_software_only(&self) -> bool {
        matches!(self, ArgumentKind::Threads | ArgumentKind::Speed)
    }

    /// Vendor encoder kinds that offload encoding to a GPU.
    pub fn is_vendor_encoder(&self) -> bool {
        matches!(
            self,
            ArgumentKind::NvidiaVideoCodec | ArgumentKind::IntelVideoCodec
        )
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an argument lands relative to the input-source tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Placement {
    /// Options the tool applies to the following input.
    BeforeInput,
    Input,
    AfterInput,
    Output,
}

/// Source of media for an [`Argument::Input`].
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// One or more local files (e.g. a video paired with a separate audio track).
    Files(Vec<PathBuf>),
    /// A remote stream.
    Uri(Url),
}

/// One typed fragment of an FFmpeg command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Hardware acceleration marker. Must precede the input.
    HwAccel(HardwareAccel),
    /// Hardware decoder selection.
    HardwareVideoCodec(VideoCodec),
    /// Loop the input (still images).
    Loop(u32),
    /// Input frame rate.
    FrameRate(f64),
    /// First index of an image sequence.
    StartNumber(u32),
    Input(InputSource),
    /// Several intermediate files read as one input via the concat protocol.
    Concat(Vec<PathBuf>),
    /// Stream copy instead of re-encoding.
    Copy(Channel),
    DisableChannel(Channel),
    /// Software video encoder with optional bitrate (kbit/s).
    VideoCodec {
        codec: VideoCodec,
        bitrate: Option<u32>,
    },
    NvidiaVideoCodec {
        codec: VideoCodec,
        bitrate: Option<u32>,
    },
    IntelVideoCodec {
        codec: VideoCodec,
        bitrate: Option<u32>,
    },
    AudioCodec {
        codec: AudioCodec,
        quality: AudioQuality,
    },
    BitstreamFilter {
        channel: Channel,
        filter: Filter,
    },
    Threads(usize),
    Speed(Speed),
    /// Scale filter (`-vf scale=w:h`).
    Scale {
        width: u32,
        height: u32,
    },
    /// Frame size (`-s WxH`).
    Size {
        width: u32,
        height: u32,
    },
    Seek(Duration),
    FrameOutputCount(u32),
    /// Stop when the shortest input ends.
    Shortest(bool),
    ForceFormat(VideoCodec),
    /// Overwrite the output without asking.
    Override,
    Output(PathBuf),
}

impl Argument {
    /// Single input file.
    pub fn input(path: impl AsRef<Path>) -> Self {
        Self::Input(InputSource::Files(vec![path.as_ref().to_path_buf()]))
    }

    /// Video input paired with a separate audio input.
    pub fn input_with_audio(video: impl AsRef<Path>, audio: impl AsRef<Path>) -> Self {
        Self::Input(InputSource::Files(vec![
            video.as_ref().to_path_buf(),
            audio.as_ref().to_path_buf(),
        ]))
    }

    /// Remote stream input.
    pub fn input_uri(uri: Url) -> Self {
        Self::Input(InputSource::Uri(uri))
    }

    pub fn output(path: impl AsRef<Path>) -> Self {
        Self::Output(path.as_ref().to_path_buf())
    }

    pub fn concat<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::Concat(paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect())
    }

    pub fn video_codec(codec: VideoCodec) -> Self {
        Self::VideoCodec {
            codec,
            bitrate: None,
        }
    }

    pub fn video_codec_with_bitrate(codec: VideoCodec, bitrate_kbps: u32) -> Self {
        Self::VideoCodec {
            codec,
            bitrate: Some(bitrate_kbps),
        }
    }

    pub fn audio_codec(codec: AudioCodec, quality: AudioQuality) -> Self {
        Self::AudioCodec { codec, quality }
    }

    /// Thread count: every available core when multithreaded, otherwise one.
    pub fn threads(multithreaded: bool) -> Self {
        let count = if multithreaded {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            1
        };
        Self::Threads(count)
    }

    pub fn kind(&self) -> ArgumentKind {
        match self {
            Argument::HwAccel(_) => ArgumentKind::HwAccel,
            Argument::HardwareVideoCodec(_) => ArgumentKind::HardwareVideoCodec,
            Argument::Loop(_) => ArgumentKind::Loop,
            Argument::FrameRate(_) => ArgumentKind::FrameRate,
            Argument::StartNumber(_) => ArgumentKind::StartNumber,
            Argument::Input(_) => ArgumentKind::Input,
            Argument::Concat(_) => ArgumentKind::Concat,
            Argument::Copy(_) => ArgumentKind::Copy,
            Argument::DisableChannel(_) => ArgumentKind::DisableChannel,
            Argument::VideoCodec { .. } => ArgumentKind::VideoCodec,
            Argument::NvidiaVideoCodec { .. } => ArgumentKind::NvidiaVideoCodec,
            Argument::IntelVideoCodec { .. } => ArgumentKind::IntelVideoCodec,
            Argument::AudioCodec { .. } => ArgumentKind::AudioCodec,
            Argument::BitstreamFilter { .. } => ArgumentKind::BitstreamFilter,
            Argument::Threads(_) => ArgumentKind::Threads,
            Argument::Speed(_) => ArgumentKind::Speed,
            Argument::Scale { .. } => ArgumentKind::Scale,
            Argument::Size { .. } => ArgumentKind::Size,
            Argument::Seek(_) => ArgumentKind::Seek,
            Argument::FrameOutputCount(_) => ArgumentKind::FrameOutputCount,
            Argument::Shortest(_) => ArgumentKind::Shortest,
            Argument::ForceFormat(_) => ArgumentKind::ForceFormat,
            Argument::Override => ArgumentKind::Override,
            Argument::Output(_) => ArgumentKind::Output,
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Argument::HwAccel(_)
            | Argument::HardwareVideoCodec(_)
            | Argument::Loop(_)
            | Argument::FrameRate(_)
            | Argument::StartNumber(_) => Placement::BeforeInput,
            Argument::VideoCodec { codec, .. } if codec.is_hardware_sentinel() => {
                Placement::BeforeInput
            }
            Argument::Input(_) | Argument::Concat(_) => Placement::Input,
            Argument::Output(_) => Placement::Output,
            _ => Placement::AfterInput,
        }
    }

    /// Position of this argument on the command line.
    ///
    /// The hardware decoder sentinel sorts as a dedicated hardware video
    /// codec, so both spellings render in the same slot.
    pub fn order_key(&self) -> (Placement, ArgumentKind) {
        let kind = match self {
            Argument::VideoCodec { codec, .. } if codec.is_hardware_sentinel() => {
                ArgumentKind::HardwareVideoCodec
            }
            other => other.kind(),
        };
        (self.placement(), kind)
    }

    /// Render this argument to command-line tokens.
    pub fn render(&self) -> Vec<String> {
        match self {
            Argument::HwAccel(accel) => flag("-hwaccel", accel.as_str()),
            Argument::HardwareVideoCodec(codec) => hardware_video(*codec),
            Argument::Loop(count) => flag("-loop", count),
            Argument::FrameRate(rate) => flag("-r", rate),
            Argument::StartNumber(index) => flag("-start_number", index),
            Argument::Input(InputSource::Files(paths)) => paths
                .iter()
                .flat_map(|p| flag("-i", p.to_string_lossy()))
                .collect(),
            Argument::Input(InputSource::Uri(uri)) => flag("-i", uri.as_str()),
            Argument::Concat(paths) => {
                let joined = paths
                    .iter()
                    .map(|p| p.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("|");
                flag("-i", format!("concat:{}", joined))
            }
            Argument::Copy(channel) => flag(format!("-c{}", channel.specifier()), "copy"),
            Argument::DisableChannel(channel) => match channel {
                Channel::Video => vec!["-vn".to_string()],
                Channel::Audio => vec!["-an".to_string()],
                Channel::Both => vec!["-vn".to_string(), "-an".to_string()],
            },
            Argument::VideoCodec { codec, bitrate } => {
                if codec.is_hardware_sentinel() {
                    hardware_video(*codec)
                } else {
                    software_video(*codec, *bitrate)
                }
            }
            Argument::NvidiaVideoCodec { codec, bitrate } => {
                let mut tokens = flag("-c:v", codec.as_str());
                tokens.extend(flag("-rc", "vbr"));
                tokens.extend(bitrate_flag("-b:v", *bitrate));
                tokens
            }
            Argument::IntelVideoCodec { codec, bitrate } => {
                let mut tokens = flag("-c:v", codec.as_str());
                tokens.extend(bitrate_flag("-b:v", *bitrate));
                tokens
            }
            Argument::AudioCodec { codec, quality } => {
                let mut tokens = flag("-c:a", codec.as_str());
                tokens.extend(bitrate_flag("-b:a", Some(quality.bitrate_kbps())));
                tokens
            }
            Argument::BitstreamFilter { channel, filter } => {
                flag(format!("-bsf{}", channel.specifier()), filter.as_str())
            }
            Argument::Threads(count) => flag("-threads", count),
            Argument::Speed(speed) => flag("-preset", speed.as_str()),
            Argument::Scale { width, height } => flag("-vf", format!("scale={}:{}", width, height)),
            Argument::Size { width, height } => flag("-s", format!("{}x{}", width, height)),
            Argument::Seek(offset) => flag("-ss", format!("{:.3}", offset.as_secs_f64())),
            Argument::FrameOutputCount(count) => flag("-vframes", count),
            Argument::Shortest(true) => vec!["-shortest".to_string()],
            Argument::Shortest(false) => Vec::new(),
            Argument::ForceFormat(format) => flag("-f", format.as_str()),
            Argument::Override => vec!["-y".to_string()],
            Argument::Output(path) => vec![path.to_string_lossy().to_string()],
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render().join(" "))
    }
}

fn flag(name: impl Into<String>, value: impl ToString) -> Vec<String> {
    vec![name.into(), value.to_string()]
}

fn bitrate_flag(name: &str, kbps: Option<u32>) -> Vec<String> {
    match kbps {
        Some(kbps) if kbps > 0 => flag(name, format!("{}k", kbps)),
        _ => Vec::new(),
    }
}

fn software_video(codec: VideoCodec, bitrate: Option<u32>) -> Vec<String> {
    let mut tokens = flag("-c:v", codec.as_str());
    tokens.extend(bitrate_flag("-b:v", bitrate));
    tokens
}

fn hardware_video(codec: VideoCodec) -> Vec<String> {
    flag("-c:v", codec.as_str())
}
