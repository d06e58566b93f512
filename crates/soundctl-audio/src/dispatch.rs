//! Dispatch of operation tables onto handles.

use tracing::trace;

use soundctl_types::{MixerOp, OpOutput, StreamOp};

use crate::mixer::MixerHandle;
use crate::stream::StreamHandle;
use crate::AudioResult;

/// Run one mixer operation.
pub fn apply_mixer_op(mixer: &mut MixerHandle, op: &MixerOp) -> AudioResult<OpOutput> {
    trace!(op = op.name(), "Applying mixer op");

    let output = match *op {
        MixerOp::CardName => OpOutput::Text(mixer.card_name()?),
        MixerOp::MixerName => OpOutput::Text(mixer.mixer_name()?),
        MixerOp::MixerId => OpOutput::Integer(i64::from(mixer.mixer_id()?)),
        MixerOp::SwitchCapabilities => OpOutput::SwitchCaps(mixer.switch_capabilities()?),
        MixerOp::VolumeCapabilities => OpOutput::VolumeCaps(mixer.volume_capabilities()?),
        MixerOp::GetVolume(direction) => OpOutput::Volumes(mixer.get_volume(direction)?),
        MixerOp::GetRange(direction) => OpOutput::Range(mixer.get_range(direction)?),
        MixerOp::GetEnumeratedValue => OpOutput::Enumerated(mixer.get_enumerated_value()?),
        MixerOp::GetMute => OpOutput::Switches(mixer.get_mute()?),
        MixerOp::GetRecord => OpOutput::Switches(mixer.get_record()?),
        MixerOp::SetVolume {
            percent,
            channel,
            direction,
        } => {
            mixer.set_volume(percent, channel, direction)?;
            OpOutput::Unit
        }
        MixerOp::SetMute { mute, channel } => {
            mixer.set_mute(mute, channel)?;
            OpOutput::Unit
        }
        MixerOp::SetRecordSource { enabled, channel } => {
            mixer.set_record_source(enabled, channel)?;
            OpOutput::Unit
        }
    };

    Ok(output)
}

/// Run one stream operation.
pub fn apply_stream_op(stream: &mut StreamHandle, op: &StreamOp) -> AudioResult<OpOutput> {
    trace!(op = op.name(), "Applying stream op");

    let output = match *op {
        StreamOp::StreamType => OpOutput::Integer(i64::from(stream.stream_type()?.code())),
        StreamOp::StreamMode => OpOutput::Integer(i64::from(stream.stream_mode()?.code())),
        StreamOp::CardName => OpOutput::Text(stream.card_name()?),
        StreamOp::SetChannels(channels) => {
            OpOutput::Integer(i64::from(stream.set_channels(channels)?))
        }
        StreamOp::SetRate(rate) => OpOutput::Integer(i64::from(stream.set_rate(rate)?)),
        StreamOp::SetFormat(format) => OpOutput::Text(stream.set_format(format)?.to_string()),
        StreamOp::SetPeriodSize(frames) => {
            let chosen = stream.set_period_size(frames)?;
            OpOutput::Integer(i64::try_from(chosen).unwrap_or(i64::MAX))
        }
    };

    Ok(output)
}

/// Run a table of mixer operations, collecting each result.
pub fn run_mixer_ops<'a>(
    mixer: &mut MixerHandle,
    ops: &'a [MixerOp],
) -> Vec<(&'a MixerOp, AudioResult<OpOutput>)> {
    ops.iter().map(|op| (op, apply_mixer_op(mixer, op))).collect()
}

/// Run a table of stream operations, collecting each result.
pub fn run_stream_ops<'a>(
    stream: &mut StreamHandle,
    ops: &'a [StreamOp],
) -> Vec<(&'a StreamOp, AudioResult<OpOutput>)> {
    ops.iter().map(|op| (op, apply_stream_op(stream, op))).collect()
}
