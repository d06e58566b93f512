//! Mixer element capability and value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a simple mixer element by name and index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MixerElementId {
    /// Element name (e.g. "Master").
    pub name: String,

    /// Element index, distinguishing elements sharing a name.
    pub index: u32,
}

impl MixerElementId {
    /// Create an element id.
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for MixerElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}',{}", self.name, self.index)
    }
}

/// Switch (mute/record) capabilities of a mixer element.
///
/// The ALSA backend only sees per-direction switches: the `Joined*` variants
/// are reported for mono elements, and `Mute`, `JoinedMute` and
/// `CaptureExclusive` never come from it since the `alsa` crate exposes no
/// common-switch or capture-group query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchCapability {
    /// A common switch for playback and capture.
    Mute,

    /// A common switch shared by all channels.
    JoinedMute,

    /// A playback switch.
    PlaybackMute,

    /// A playback switch shared by all channels.
    JoinedPlaybackMute,

    /// A capture switch.
    CaptureMute,

    /// A capture switch shared by all channels.
    JoinedCaptureMute,

    /// Only one element in the capture group may be switched on.
    CaptureExclusive,
}

impl SwitchCapability {
    /// Returns the display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mute => "Mute",
            Self::JoinedMute => "Joined Mute",
            Self::PlaybackMute => "Playback Mute",
            Self::JoinedPlaybackMute => "Joined Playback Mute",
            Self::CaptureMute => "Capture Mute",
            Self::JoinedCaptureMute => "Joined Capture Mute",
            Self::CaptureExclusive => "Capture Exclusive",
        }
    }
}

impl fmt::Display for SwitchCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Volume capabilities of a mixer element.
///
/// As with [`SwitchCapability`], the ALSA backend reports `Joined*` for mono
/// elements and never reports the common `Volume` or `JoinedVolume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeCapability {
    /// A common volume for playback and capture.
    Volume,

    /// A common volume shared by all channels.
    JoinedVolume,

    /// A playback volume.
    PlaybackVolume,

    /// A playback volume shared by all channels.
    JoinedPlaybackVolume,

    /// A capture volume.
    CaptureVolume,

    /// A capture volume shared by all channels.
    JoinedCaptureVolume,
}

impl VolumeCapability {
    /// Returns the display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Volume => "Volume",
            Self::JoinedVolume => "Joined Volume",
            Self::PlaybackVolume => "Playback Volume",
            Self::JoinedPlaybackVolume => "Joined Playback Volume",
            Self::CaptureVolume => "Capture Volume",
            Self::JoinedCaptureVolume => "Joined Capture Volume",
        }
    }
}

impl fmt::Display for VolumeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw volume range reported by a mixer element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRange {
    pub min: i64,
    pub max: i64,
}

impl VolumeRange {
    /// Create a new range.
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Returns true if the range cannot express more than one value.
    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }

    /// Convert a raw value to a percentage in `0..=100`.
    pub fn to_percent(&self, raw: i64) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let span = (self.max - self.min) as f64;
        let percent = (100.0 * (raw - self.min) as f64 / span).round();
        percent.clamp(0.0, 100.0) as u8
    }

    /// Convert a percentage to a raw value inside the range.
    pub fn from_percent(&self, percent: u8) -> i64 {
        if self.is_empty() {
            return self.min;
        }
        let span = (self.max - self.min) as f64;
        let raw = self.min + (span * f64::from(percent.min(100)) / 100.0).round() as i64;
        raw.clamp(self.min, self.max)
    }
}

/// Current item and item list of an enumerated mixer element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratedValue {
    /// The currently selected item.
    pub current: String,

    /// All selectable items, in driver order.
    pub items: Vec<String>,
}

/// Which channels a mixer mutation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelSelector {
    /// Every channel of the element.
    #[default]
    All,

    /// A single channel by position.
    Channel(u32),
}

impl ChannelSelector {
    /// Returns true if `channel` is targeted by this selector.
    pub fn includes(self, channel: u32) -> bool {
        match self {
            Self::All => true,
            Self::Channel(c) => c == channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_percent_conversion() {
        let range = VolumeRange::new(0, 87);
        assert_eq!(range.to_percent(0), 0);
        assert_eq!(range.to_percent(87), 100);
        assert_eq!(range.to_percent(44), 51);
        assert_eq!(range.from_percent(0), 0);
        assert_eq!(range.from_percent(100), 87);
        assert_eq!(range.from_percent(50), 44);
    }

    #[test]
    fn test_volume_percent_negative_range() {
        let range = VolumeRange::new(-10239, 400);
        assert_eq!(range.to_percent(-10239), 0);
        assert_eq!(range.to_percent(400), 100);
        assert_eq!(range.from_percent(100), 400);
    }

    #[test]
    fn test_volume_percent_clamps() {
        let range = VolumeRange::new(0, 100);
        assert_eq!(range.to_percent(150), 100);
        assert_eq!(range.to_percent(-5), 0);
        assert_eq!(range.from_percent(200), 100);
    }

    #[test]
    fn test_empty_range() {
        let range = VolumeRange::default();
        assert!(range.is_empty());
        assert_eq!(range.to_percent(12), 0);
        assert_eq!(range.from_percent(80), 0);
    }

    #[test]
    fn test_channel_selector() {
        assert!(ChannelSelector::All.includes(5));
        assert!(ChannelSelector::Channel(1).includes(1));
        assert!(!ChannelSelector::Channel(1).includes(0));
    }

    #[test]
    fn test_element_id_display() {
        assert_eq!(MixerElementId::new("Capture", 1).to_string(), "'Capture',1");
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(SwitchCapability::JoinedPlaybackMute.to_string(), "Joined Playback Mute");
        assert_eq!(VolumeCapability::CaptureVolume.to_string(), "Capture Volume");
    }
}
