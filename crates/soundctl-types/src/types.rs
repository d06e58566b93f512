//! Common types for selecting and configuring sound devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ParseError, DEFAULT_DEVICE};

/// Selects which card (or named device) an operation is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSelector {
    /// The system default card ("default").
    #[default]
    Default,

    /// A zero-based hardware card index ("hw:N").
    CardIndex(u32),

    /// An explicit ALSA device string, used verbatim.
    Device(String),
}

impl CardSelector {
    /// Returns the ALSA device string this selector resolves to.
    pub fn device_name(&self) -> String {
        match self {
            Self::Default => DEFAULT_DEVICE.to_string(),
            Self::CardIndex(index) => format!("hw:{index}"),
            Self::Device(name) => name.clone(),
        }
    }
}

impl fmt::Display for CardSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.device_name())
    }
}

impl FromStr for CardSelector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptySelector);
        }
        if s == DEFAULT_DEVICE {
            return Ok(Self::Default);
        }
        match s.parse::<u32>() {
            Ok(index) => Ok(Self::CardIndex(index)),
            Err(_) => Ok(Self::Device(s.to_string())),
        }
    }
}

/// A sound card present on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    /// Zero-based card index.
    pub index: u32,

    /// Short card identifier (e.g. "PCH").
    pub id: String,

    /// Long descriptive name.
    pub long_name: String,
}

impl CardInfo {
    /// Returns the selector scoping operations to this card.
    pub fn selector(&self) -> CardSelector {
        CardSelector::CardIndex(self.index)
    }
}

/// Direction of a PCM stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    /// Output to the device.
    #[default]
    Playback,

    /// Input from the device.
    Capture,
}

impl StreamType {
    /// Both directions, playback first.
    pub const ALL: [StreamType; 2] = [StreamType::Playback, StreamType::Capture];

    /// Returns the stable integer code (Playback=0, Capture=1).
    pub fn code(self) -> i32 {
        match self {
            Self::Playback => 0,
            Self::Capture => 1,
        }
    }

    /// Returns the display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Playback => "playback",
            Self::Capture => "capture",
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "playback" | "0" => Ok(Self::Playback),
            "capture" | "1" => Ok(Self::Capture),
            _ => Err(ParseError::UnknownStreamType(s.to_string())),
        }
    }
}

/// Open mode of a PCM stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamMode {
    /// Blocking open and transfer.
    #[default]
    Normal,

    /// Non-blocking open and transfer.
    NonBlock,
}

impl StreamMode {
    /// Returns the stable integer code (Normal=0, NonBlock=1).
    pub fn code(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::NonBlock => 1,
        }
    }

    /// Returns true for non-blocking mode.
    pub fn is_nonblocking(self) -> bool {
        matches!(self, Self::NonBlock)
    }
}

/// PCM sample format. Serialised under its ALSA name (`S16_LE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum SampleFormat {
    S8,
    U8,
    S16Le,
    S16Be,
    U16Le,
    U16Be,
    S24Le,
    S24Be,
    U24Le,
    U24Be,
    S32Le,
    S32Be,
    U32Le,
    U32Be,
    FloatLe,
    FloatBe,
    Float64Le,
    Float64Be,
    MuLaw,
    ALaw,
    ImaAdpcm,
    Mpeg,
    Gsm,
}

impl SampleFormat {
    /// Every known format.
    pub const ALL: [SampleFormat; 23] = [
        Self::S8,
        Self::U8,
        Self::S16Le,
        Self::S16Be,
        Self::U16Le,
        Self::U16Be,
        Self::S24Le,
        Self::S24Be,
        Self::U24Le,
        Self::U24Be,
        Self::S32Le,
        Self::S32Be,
        Self::U32Le,
        Self::U32Be,
        Self::FloatLe,
        Self::FloatBe,
        Self::Float64Le,
        Self::Float64Be,
        Self::MuLaw,
        Self::ALaw,
        Self::ImaAdpcm,
        Self::Mpeg,
        Self::Gsm,
    ];

    /// Returns the ALSA name of this format.
    pub fn name(self) -> &'static str {
        match self {
            Self::S8 => "S8",
            Self::U8 => "U8",
            Self::S16Le => "S16_LE",
            Self::S16Be => "S16_BE",
            Self::U16Le => "U16_LE",
            Self::U16Be => "U16_BE",
            Self::S24Le => "S24_LE",
            Self::S24Be => "S24_BE",
            Self::U24Le => "U24_LE",
            Self::U24Be => "U24_BE",
            Self::S32Le => "S32_LE",
            Self::S32Be => "S32_BE",
            Self::U32Le => "U32_LE",
            Self::U32Be => "U32_BE",
            Self::FloatLe => "FLOAT_LE",
            Self::FloatBe => "FLOAT_BE",
            Self::Float64Le => "FLOAT64_LE",
            Self::Float64Be => "FLOAT64_BE",
            Self::MuLaw => "MU_LAW",
            Self::ALaw => "A_LAW",
            Self::ImaAdpcm => "IMA_ADPCM",
            Self::Mpeg => "MPEG",
            Self::Gsm => "GSM",
        }
    }

    /// Returns the physical sample width in bits, for fixed-width formats.
    pub fn bits(self) -> Option<u32> {
        match self {
            Self::S8 | Self::U8 | Self::MuLaw | Self::ALaw => Some(8),
            Self::S16Le | Self::S16Be | Self::U16Le | Self::U16Be => Some(16),
            // 24-bit samples in 32-bit containers
            Self::S24Le
            | Self::S24Be
            | Self::U24Le
            | Self::U24Be
            | Self::S32Le
            | Self::S32Be
            | Self::U32Le
            | Self::U32Be
            | Self::FloatLe
            | Self::FloatBe => Some(32),
            Self::Float64Le | Self::Float64Be => Some(64),
            Self::ImaAdpcm | Self::Mpeg | Self::Gsm => None,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<SampleFormat> for &'static str {
    fn from(format: SampleFormat) -> Self {
        format.name()
    }
}

impl TryFrom<String> for SampleFormat {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for SampleFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.name() == wanted)
            .ok_or_else(|| ParseError::UnknownFormat(s.to_string()))
    }
}

/// Hardware parameters applied to an open PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamParams {
    /// Number of interleaved channels.
    pub channels: u32,

    /// Sample rate in Hz.
    pub rate: u32,

    /// Sample format.
    pub format: SampleFormat,

    /// Frames per period.
    pub period_size: u64,
}

impl StreamParams {
    /// Parameters every device is expected to accept: 2 channels,
    /// 44100 Hz, signed 8-bit, 320-frame periods.
    pub fn calibration() -> Self {
        Self {
            channels: 2,
            rate: 44100,
            format: SampleFormat::S8,
            period_size: 320,
        }
    }

    /// Bytes per frame, when the format has a fixed width.
    pub fn frame_bytes(&self) -> Option<u64> {
        self.format
            .bits()
            .map(|bits| u64::from(bits.div_ceil(8)) * u64::from(self.channels))
    }
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            channels: 2,
            rate: 44100,
            format: SampleFormat::S16Le,
            period_size: 32,
        }
    }
}
