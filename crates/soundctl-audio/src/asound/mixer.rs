//! ALSA simple mixer elements.

use alsa::mixer::{Mixer, Selem, SelemChannelId, SelemId};
use tracing::trace;

use soundctl_types::{
    CardSelector, ChannelSelector, EnumeratedValue, MixerElementId, StreamType, SwitchCapability,
    VolumeCapability, VolumeRange,
};

use crate::backend::MixerDevice;
use crate::error::AudioError;
use crate::AudioResult;

use super::open_error;

/// An attached mixer plus the element it controls.
///
/// `Selem` borrows the mixer, so the element is looked up per call.
pub(super) struct AlsaMixer {
    mixer: Mixer,
    device: String,
    element: MixerElementId,
}

impl AlsaMixer {
    pub(super) fn open(scope: &CardSelector, element: &MixerElementId) -> AudioResult<Self> {
        let device = scope.device_name();
        let mixer = Mixer::new(&device, false).map_err(|e| open_error(&device, e))?;

        let found = mixer
            .find_selem(&SelemId::new(&element.name, element.index))
            .is_some();
        if !found {
            return Err(AudioError::unavailable(
                device,
                format!("unable to find mixer control {element}"),
            ));
        }

        trace!(%device, %element, "ALSA mixer element attached");
        Ok(Self {
            mixer,
            device,
            element: element.clone(),
        })
    }

    fn selem(&self) -> AudioResult<Selem<'_>> {
        self.mixer
            .find_selem(&SelemId::new(&self.element.name, self.element.index))
            .ok_or_else(|| {
                AudioError::device(format!("mixer control {} disappeared", self.element))
            })
    }
}

fn has_volume(selem: &Selem<'_>, direction: StreamType) -> bool {
    match direction {
        StreamType::Playback => selem.has_playback_volume(),
        StreamType::Capture => selem.has_capture_volume(),
    }
}

fn has_switch(selem: &Selem<'_>, direction: StreamType) -> bool {
    match direction {
        StreamType::Playback => selem.has_playback_switch(),
        StreamType::Capture => selem.has_capture_switch(),
    }
}

/// Channels present on the element in `direction`, in position order.
fn channels(selem: &Selem<'_>, direction: StreamType) -> Vec<SelemChannelId> {
    SelemChannelId::all()
        .iter()
        .copied()
        .filter(|&channel| match direction {
            StreamType::Playback => selem.has_playback_channel(channel),
            StreamType::Capture => selem.has_capture_channel(channel),
        })
        .collect()
}

/// Channels targeted by `selector`.
fn targets(
    selem: &Selem<'_>,
    direction: StreamType,
    selector: ChannelSelector,
) -> AudioResult<Vec<SelemChannelId>> {
    let present = channels(selem, direction);
    match selector {
        ChannelSelector::All => Ok(present),
        ChannelSelector::Channel(c) => present
            .get(c as usize)
            .copied()
            .map(|channel| vec![channel])
            .ok_or_else(|| {
                AudioError::unsupported(
                    "channel",
                    c,
                    format!("element has {} {direction} channels", present.len()),
                )
            }),
    }
}

impl MixerDevice for AlsaMixer {
    fn card_name(&self) -> AudioResult<String> {
        Ok(self.device.clone())
    }

    fn switch_capabilities(&self) -> AudioResult<Vec<SwitchCapability>> {
        let selem = self.selem()?;
        let mut caps = Vec::new();
        if selem.has_playback_switch() {
            caps.push(SwitchCapability::PlaybackMute);
            if selem.is_playback_mono() {
                caps.push(SwitchCapability::JoinedPlaybackMute);
            }
        }
        if selem.has_capture_switch() {
            caps.push(SwitchCapability::CaptureMute);
            if selem.is_capture_mono() {
                caps.push(SwitchCapability::JoinedCaptureMute);
            }
        }
        Ok(caps)
    }

    fn volume_capabilities(&self) -> AudioResult<Vec<VolumeCapability>> {
        let selem = self.selem()?;
        let mut caps = Vec::new();
        if selem.has_playback_volume() {
            caps.push(VolumeCapability::PlaybackVolume);
            if selem.is_playback_mono() {
                caps.push(VolumeCapability::JoinedPlaybackVolume);
            }
        }
        if selem.has_capture_volume() {
            caps.push(VolumeCapability::CaptureVolume);
            if selem.is_capture_mono() {
                caps.push(VolumeCapability::JoinedCaptureVolume);
            }
        }
        Ok(caps)
    }

    fn volume_range(&self, direction: StreamType) -> AudioResult<Option<VolumeRange>> {
        let selem = self.selem()?;
        if !has_volume(&selem, direction) {
            return Ok(None);
        }
        let (min, max) = match direction {
            StreamType::Playback => selem.get_playback_volume_range(),
            StreamType::Capture => selem.get_capture_volume_range(),
        };
        Ok(Some(VolumeRange::new(min, max)))
    }

    fn volumes(&self, direction: StreamType) -> AudioResult<Vec<i64>> {
        let selem = self.selem()?;
        if !has_volume(&selem, direction) {
            return Ok(Vec::new());
        }
        channels(&selem, direction)
            .into_iter()
            .map(|channel| -> AudioResult<i64> {
                let raw = match direction {
                    StreamType::Playback => selem.get_playback_volume(channel)?,
                    StreamType::Capture => selem.get_capture_volume(channel)?,
                };
                Ok(raw)
            })
            .collect()
    }

    fn set_volume(
        &mut self,
        direction: StreamType,
        channel: ChannelSelector,
        raw: i64,
    ) -> AudioResult<()> {
        let selem = self.selem()?;
        for target in targets(&selem, direction, channel)? {
            match direction {
                StreamType::Playback => selem.set_playback_volume(target, raw)?,
                StreamType::Capture => selem.set_capture_volume(target, raw)?,
            }
        }
        Ok(())
    }

    fn switches(&self, direction: StreamType) -> AudioResult<Option<Vec<bool>>> {
        let selem = self.selem()?;
        if !has_switch(&selem, direction) {
            return Ok(None);
        }
        let states = channels(&selem, direction)
            .into_iter()
            .map(|channel| -> AudioResult<bool> {
                let value = match direction {
                    StreamType::Playback => selem.get_playback_switch(channel)?,
                    StreamType::Capture => selem.get_capture_switch(channel)?,
                };
                Ok(value != 0)
            })
            .collect::<AudioResult<Vec<bool>>>()?;
        Ok(Some(states))
    }

    fn set_switch(
        &mut self,
        direction: StreamType,
        channel: ChannelSelector,
        on: bool,
    ) -> AudioResult<()> {
        let selem = self.selem()?;
        let value = i32::from(on);
        for target in targets(&selem, direction, channel)? {
            match direction {
                StreamType::Playback => selem.set_playback_switch(target, value)?,
                StreamType::Capture => selem.set_capture_switch(target, value)?,
            }
        }
        Ok(())
    }

    fn enumerated(&self) -> AudioResult<Option<EnumeratedValue>> {
        let selem = self.selem()?;
        if !selem.is_enumerated() {
            return Ok(None);
        }
        let items = selem
            .iter_enum()?
            .collect::<Result<Vec<String>, alsa::Error>>()?;
        let current = selem.get_enum_item(SelemChannelId::mono())?;
        Ok(Some(EnumeratedValue {
            current: items.get(current as usize).cloned().unwrap_or_default(),
            items,
        }))
    }

    fn close(&mut self) -> AudioResult<()> {
        trace!(device = %self.device, element = %self.element, "ALSA mixer element released");
        Ok(())
    }
}
