//! Operation tables for mixer and stream handles.
//!
//! Each variant names one handle operation together with its arguments, so
//! that callers can run a whole table of operations generically.

use serde::{Deserialize, Serialize};

use crate::mixer::{ChannelSelector, EnumeratedValue, SwitchCapability, VolumeCapability, VolumeRange};
use crate::types::{SampleFormat, StreamParams, StreamType};

/// Operations on an open mixer handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MixerOp {
    /// Name of the card (device string) the mixer is attached to.
    CardName,

    /// Name of the mixer element.
    MixerName,

    /// Index of the mixer element.
    MixerId,

    /// Switch capabilities of the element.
    SwitchCapabilities,

    /// Volume capabilities of the element.
    VolumeCapabilities,

    /// Per-channel volume percentages in the given direction.
    GetVolume(StreamType),

    /// Raw volume range in the given direction.
    GetRange(StreamType),

    /// Current item of an enumerated element.
    GetEnumeratedValue,

    /// Per-channel playback switch states.
    GetMute,

    /// Per-channel capture switch states.
    GetRecord,

    /// Set the volume percentage.
    SetVolume {
        percent: u8,
        channel: ChannelSelector,
        direction: StreamType,
    },

    /// Mute or unmute.
    SetMute {
        mute: bool,
        channel: ChannelSelector,
    },

    /// Enable or disable the element as a record source.
    SetRecordSource {
        enabled: bool,
        channel: ChannelSelector,
    },
}

impl MixerOp {
    /// The accessors every open mixer handle must answer.
    pub fn readers() -> Vec<MixerOp> {
        vec![
            Self::CardName,
            Self::MixerName,
            Self::MixerId,
            Self::SwitchCapabilities,
            Self::VolumeCapabilities,
            Self::GetVolume(StreamType::Playback),
            Self::GetRange(StreamType::Playback),
            Self::GetEnumeratedValue,
        ]
    }

    /// Every operation kind, with representative arguments.
    pub fn all() -> Vec<MixerOp> {
        let mut ops = Self::readers();
        ops.extend([
            Self::GetMute,
            Self::GetRecord,
            Self::SetVolume {
                percent: 60,
                channel: ChannelSelector::All,
                direction: StreamType::Playback,
            },
            Self::SetMute {
                mute: false,
                channel: ChannelSelector::All,
            },
            Self::SetRecordSource {
                enabled: false,
                channel: ChannelSelector::All,
            },
        ]);
        ops
    }

    /// Returns the short method name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CardName => "cardname",
            Self::MixerName => "mixer",
            Self::MixerId => "mixerid",
            Self::SwitchCapabilities => "switchcap",
            Self::VolumeCapabilities => "volumecap",
            Self::GetVolume(_) => "getvolume",
            Self::GetRange(_) => "getrange",
            Self::GetEnumeratedValue => "getenum",
            Self::GetMute => "getmute",
            Self::GetRecord => "getrec",
            Self::SetVolume { .. } => "setvolume",
            Self::SetMute { .. } => "setmute",
            Self::SetRecordSource { .. } => "setrec",
        }
    }

    /// Returns true if this operation changes the element.
    pub fn is_mutator(&self) -> bool {
        matches!(
            self,
            Self::SetVolume { .. } | Self::SetMute { .. } | Self::SetRecordSource { .. }
        )
    }
}

/// Operations on an open PCM stream handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamOp {
    /// Direction code of the stream.
    StreamType,

    /// Mode code of the stream.
    StreamMode,

    /// Name of the card the stream is open on.
    CardName,

    /// Set the channel count.
    SetChannels(u32),

    /// Set the sample rate.
    SetRate(u32),

    /// Set the sample format.
    SetFormat(SampleFormat),

    /// Set the period size in frames.
    SetPeriodSize(u64),
}

impl StreamOp {
    /// The accessors of an open stream.
    pub fn readers() -> Vec<StreamOp> {
        vec![Self::StreamType, Self::StreamMode, Self::CardName]
    }

    /// The accessors followed by the configuration mutators for `params`.
    pub fn configure(params: &StreamParams) -> Vec<StreamOp> {
        let mut ops = Self::readers();
        ops.extend([
            Self::SetChannels(params.channels),
            Self::SetRate(params.rate),
            Self::SetFormat(params.format),
            Self::SetPeriodSize(params.period_size),
        ]);
        ops
    }

    /// The calibration table: accessors, then 2 channels, 44100 Hz, S8 and
    /// 320-frame periods.
    pub fn calibration() -> Vec<StreamOp> {
        Self::configure(&StreamParams::calibration())
    }

    /// Returns the short method name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StreamType => "pcmtype",
            Self::StreamMode => "pcmmode",
            Self::CardName => "cardname",
            Self::SetChannels(_) => "setchannels",
            Self::SetRate(_) => "setrate",
            Self::SetFormat(_) => "setformat",
            Self::SetPeriodSize(_) => "setperiodsize",
        }
    }

    /// Returns true if this operation changes stream parameters.
    pub fn is_mutator(&self) -> bool {
        matches!(
            self,
            Self::SetChannels(_) | Self::SetRate(_) | Self::SetFormat(_) | Self::SetPeriodSize(_)
        )
    }
}

/// Result value of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum OpOutput {
    /// The operation returned nothing.
    Unit,

    /// A text value.
    Text(String),

    /// An integer value.
    Integer(i64),

    /// A list of per-channel percentages.
    Volumes(Vec<u8>),

    /// A list of per-channel switch states.
    Switches(Vec<bool>),

    /// A raw volume range.
    Range(VolumeRange),

    /// An enumerated value, absent for non-enumerated elements.
    Enumerated(Option<EnumeratedValue>),

    /// Switch capabilities.
    SwitchCaps(Vec<SwitchCapability>),

    /// Volume capabilities.
    VolumeCaps(Vec<VolumeCapability>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixer_readers_table() {
        let names: Vec<_> = MixerOp::readers().iter().map(MixerOp::name).collect();
        assert_eq!(
            names,
            [
                "cardname",
                "mixer",
                "mixerid",
                "switchcap",
                "volumecap",
                "getvolume",
                "getrange",
                "getenum"
            ]
        );
        assert!(MixerOp::readers().iter().all(|op| !op.is_mutator()));
    }

    #[test]
    fn test_mixer_all_includes_mutators() {
        let ops = MixerOp::all();
        assert_eq!(ops.len(), 13);
        assert_eq!(ops.iter().filter(|op| op.is_mutator()).count(), 3);
    }

    #[test]
    fn test_stream_calibration_table() {
        let ops = StreamOp::calibration();
        let names: Vec<_> = ops.iter().map(StreamOp::name).collect();
        assert_eq!(
            names,
            [
                "pcmtype",
                "pcmmode",
                "cardname",
                "setchannels",
                "setrate",
                "setformat",
                "setperiodsize"
            ]
        );
        assert!(ops.contains(&StreamOp::SetChannels(2)));
        assert!(ops.contains(&StreamOp::SetRate(44100)));
        assert!(ops.contains(&StreamOp::SetFormat(SampleFormat::S8)));
        assert!(ops.contains(&StreamOp::SetPeriodSize(320)));
    }

    #[test]
    fn test_op_output_serializes_tagged() {
        let json = serde_json::to_string(&OpOutput::Integer(7)).unwrap();
        assert_eq!(json, r#"{"type":"Integer","value":7}"#);
        let json = serde_json::to_string(&OpOutput::Unit).unwrap();
        assert_eq!(json, r#"{"type":"Unit"}"#);
    }
}
