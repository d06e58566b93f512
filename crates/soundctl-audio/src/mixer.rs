//! Mixer element handles.

use tracing::{debug, info, instrument};

use soundctl_types::{
    CardSelector, ChannelSelector, EnumeratedValue, MixerElementId, StreamType, SwitchCapability,
    VolumeCapability, VolumeRange,
};

use crate::backend::{MixerDevice, SoundBackend};
use crate::error::AudioError;
use crate::handle::Lifecycle;
use crate::AudioResult;

/// An open control surface for one simple mixer element on one card.
pub struct MixerHandle {
    element: MixerElementId,
    device: Lifecycle<Box<dyn MixerDevice>>,
}

impl MixerHandle {
    /// Open the first element called `name` in `scope`.
    pub fn open(backend: &dyn SoundBackend, name: &str, scope: &CardSelector) -> AudioResult<Self> {
        Self::open_element(backend, &MixerElementId::new(name, 0), scope)
    }

    /// Open a specific element (name and index) in `scope`.
    #[instrument(name = "mixer_open", skip(backend), fields(backend = backend.name()))]
    pub fn open_element(
        backend: &dyn SoundBackend,
        element: &MixerElementId,
        scope: &CardSelector,
    ) -> AudioResult<Self> {
        let device = backend.open_mixer(scope, element)?;
        debug!(%element, %scope, "Mixer element opened");

        Ok(Self {
            element: element.clone(),
            device: Lifecycle::open(device, "mixer"),
        })
    }

    /// Release the element. Fails with `InvalidState` if already closed.
    #[instrument(name = "mixer_close", skip(self), fields(element = %self.element))]
    pub fn close(&mut self) -> AudioResult<()> {
        let mut device = self.device.take("close")?;
        device.close()?;
        info!("Mixer element closed");
        Ok(())
    }

    /// Returns true until [`MixerHandle::close`] succeeds.
    pub fn is_open(&self) -> bool {
        self.device.is_open()
    }

    /// Name of the card the element belongs to.
    pub fn card_name(&self) -> AudioResult<String> {
        self.device.get("cardname")?.card_name()
    }

    /// Name of the element.
    pub fn mixer_name(&self) -> AudioResult<String> {
        self.device.get("mixer")?;
        Ok(self.element.name.clone())
    }

    /// Index of the element.
    pub fn mixer_id(&self) -> AudioResult<u32> {
        self.device.get("mixerid")?;
        Ok(self.element.index)
    }

    /// Switch capabilities of the element.
    pub fn switch_capabilities(&self) -> AudioResult<Vec<SwitchCapability>> {
        self.device.get("switchcap")?.switch_capabilities()
    }

    /// Volume capabilities of the element.
    pub fn volume_capabilities(&self) -> AudioResult<Vec<VolumeCapability>> {
        self.device.get("volumecap")?.volume_capabilities()
    }

    /// Per-channel volumes in percent. Empty if the element has no volume in
    /// `direction`.
    pub fn get_volume(&self, direction: StreamType) -> AudioResult<Vec<u8>> {
        let device = self.device.get("getvolume")?;
        let Some(range) = device.volume_range(direction)? else {
            return Ok(Vec::new());
        };
        let volumes = device.volumes(direction)?;
        Ok(volumes.into_iter().map(|raw| range.to_percent(raw)).collect())
    }

    /// Raw volume range. `(0, 0)` if the element has no volume in `direction`.
    pub fn get_range(&self, direction: StreamType) -> AudioResult<VolumeRange> {
        let device = self.device.get("getrange")?;
        Ok(device.volume_range(direction)?.unwrap_or_default())
    }

    /// Current item of an enumerated element, `None` otherwise.
    pub fn get_enumerated_value(&self) -> AudioResult<Option<EnumeratedValue>> {
        self.device.get("getenum")?.enumerated()
    }

    /// Per-channel mute states (`true` = muted).
    pub fn get_mute(&self) -> AudioResult<Vec<bool>> {
        let device = self.device.get("getmute")?;
        let switches = device
            .switches(StreamType::Playback)?
            .ok_or_else(|| self.no_switch("mute", StreamType::Playback))?;
        Ok(switches.into_iter().map(|on| !on).collect())
    }

    /// Per-channel record states (`true` = recording).
    pub fn get_record(&self) -> AudioResult<Vec<bool>> {
        let device = self.device.get("getrec")?;
        device
            .switches(StreamType::Capture)?
            .ok_or_else(|| self.no_switch("record", StreamType::Capture))
    }

    /// Set the volume of the selected channels, in percent.
    #[instrument(name = "mixer_set_volume", skip(self), fields(element = %self.element))]
    pub fn set_volume(
        &mut self,
        percent: u8,
        channel: ChannelSelector,
        direction: StreamType,
    ) -> AudioResult<()> {
        let element = &self.element;
        let device = self.device.get_mut("setvolume")?;
        if percent > 100 {
            return Err(AudioError::unsupported(
                "volume",
                percent,
                "must be between 0 and 100",
            ));
        }
        let range = device.volume_range(direction)?.ok_or_else(|| {
            AudioError::unsupported(
                "volume",
                percent,
                format!("mixer {element} has no {direction} volume"),
            )
        })?;
        device.set_volume(direction, channel, range.from_percent(percent))
    }

    /// Mute or unmute the selected channels.
    #[instrument(name = "mixer_set_mute", skip(self), fields(element = %self.element))]
    pub fn set_mute(&mut self, mute: bool, channel: ChannelSelector) -> AudioResult<()> {
        let element = &self.element;
        let device = self.device.get_mut("setmute")?;
        if device.switches(StreamType::Playback)?.is_none() {
            return Err(no_switch(element, "mute", StreamType::Playback));
        }
        device.set_switch(StreamType::Playback, channel, !mute)
    }

    /// Enable or disable the selected channels as a record source.
    #[instrument(name = "mixer_set_record", skip(self), fields(element = %self.element))]
    pub fn set_record_source(&mut self, enabled: bool, channel: ChannelSelector) -> AudioResult<()> {
        let element = &self.element;
        let device = self.device.get_mut("setrec")?;
        if device.switches(StreamType::Capture)?.is_none() {
            return Err(no_switch(element, "record", StreamType::Capture));
        }
        device.set_switch(StreamType::Capture, channel, enabled)
    }

    fn no_switch(&self, what: &'static str, direction: StreamType) -> AudioError {
        no_switch(&self.element, what, direction)
    }
}

fn no_switch(element: &MixerElementId, what: &'static str, direction: StreamType) -> AudioError {
    AudioError::unsupported(
        what,
        element,
        format!("mixer has no {direction} switch"),
    )
}

impl Drop for MixerHandle {
    fn drop(&mut self) {
        if let Some(mut device) = self.device.take_if_open() {
            let _ = device.close();
        }
    }
}

impl std::fmt::Debug for MixerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixerHandle")
            .field("element", &self.element)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MockBackend};

    fn open_master(backend: &MockBackend) -> MixerHandle {
        MixerHandle::open(backend, "Master", &CardSelector::Default).unwrap()
    }

    #[test]
    fn test_volume_in_percent() {
        let backend = MockBackend::demo();
        let mut mixer = open_master(&backend);

        // raw 65 of 0..=87
        assert_eq!(mixer.get_volume(StreamType::Playback).unwrap(), vec![75, 75]);

        mixer
            .set_volume(100, ChannelSelector::Channel(1), StreamType::Playback)
            .unwrap();
        assert_eq!(mixer.get_volume(StreamType::Playback).unwrap(), vec![75, 100]);
        assert!(mixer.get_volume(StreamType::Capture).unwrap().is_empty());
    }

    #[test]
    fn test_volume_over_100_rejected() {
        let backend = MockBackend::demo();
        let mut mixer = open_master(&backend);
        let err = mixer
            .set_volume(101, ChannelSelector::All, StreamType::Playback)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedParameter);
    }

    #[test]
    fn test_mute_inverts_switch() {
        let backend = MockBackend::demo();
        let mut mixer = open_master(&backend);
        assert_eq!(mixer.get_mute().unwrap(), vec![false, false]);

        mixer.set_mute(true, ChannelSelector::All).unwrap();
        assert_eq!(mixer.get_mute().unwrap(), vec![true, true]);
    }

    #[test]
    fn test_record_requires_capture_switch() {
        let backend = MockBackend::demo();
        let mut mixer = open_master(&backend);
        assert_eq!(mixer.get_record().unwrap_err().kind(), ErrorKind::UnsupportedParameter);
        assert_eq!(
            mixer
                .set_record_source(true, ChannelSelector::All)
                .unwrap_err()
                .kind(),
            ErrorKind::UnsupportedParameter
        );

        let mut capture = MixerHandle::open(&backend, "Capture", &CardSelector::CardIndex(0)).unwrap();
        capture.set_record_source(true, ChannelSelector::Channel(0)).unwrap();
        assert_eq!(capture.get_record().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_second_close_is_invalid_state() {
        let backend = MockBackend::demo();
        let mut mixer = open_master(&backend);
        mixer.close().unwrap();
        assert!(!mixer.is_open());
        assert_eq!(mixer.close().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_duplicate_names_by_index() {
        let backend = MockBackend::demo();
        let second = MixerHandle::open_element(
            &backend,
            &MixerElementId::new("Capture", 1),
            &CardSelector::Default,
        )
        .unwrap();
        assert_eq!(second.mixer_id().unwrap(), 1);
        assert_eq!(second.get_volume(StreamType::Capture).unwrap(), vec![0, 0]);
    }
}
