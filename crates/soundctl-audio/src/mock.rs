//! In-memory sound backend.
//!
//! `MockBackend` models a host with scripted cards, mixer elements and PCM
//! devices. It honours the same contract as the native backend: exclusive
//! devices report `DeviceUnavailable` while held, rejected parameters report
//! `UnsupportedParameter`, and injected faults surface as `DeviceError`.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use soundctl_types::{
    CardInfo, CardSelector, ChannelSelector, EnumeratedValue, MixerElementId, SampleFormat,
    StreamMode, StreamParams, StreamType, SwitchCapability, VolumeCapability, VolumeRange,
};

use crate::backend::{MixerDevice, PcmDevice, SoundBackend};
use crate::error::AudioError;
use crate::AudioResult;

/// A scripted simple mixer element.
#[derive(Debug, Clone)]
pub struct MockElement {
    id: MixerElementId,
    playback: Option<(VolumeRange, Vec<i64>)>,
    capture: Option<(VolumeRange, Vec<i64>)>,
    playback_switch: Option<Vec<bool>>,
    capture_switch: Option<Vec<bool>>,
    capture_exclusive: bool,
    enumerated: Option<(Vec<String>, usize)>,
    exclusive: bool,
}

impl MockElement {
    /// An element with no volume, switch or enumeration.
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            id: MixerElementId::new(name, index),
            playback: None,
            capture: None,
            playback_switch: None,
            capture_switch: None,
            capture_exclusive: false,
            enumerated: None,
            exclusive: false,
        }
    }

    /// Add a playback volume with `channels` channels at raw value `initial`.
    pub fn playback_volume(mut self, range: VolumeRange, channels: usize, initial: i64) -> Self {
        self.playback = Some((range, vec![initial; channels]));
        self
    }

    /// Add a capture volume with `channels` channels at raw value `initial`.
    pub fn capture_volume(mut self, range: VolumeRange, channels: usize, initial: i64) -> Self {
        self.capture = Some((range, vec![initial; channels]));
        self
    }

    /// Add a playback switch with `channels` channels, initially on.
    pub fn playback_switch(mut self, channels: usize) -> Self {
        self.playback_switch = Some(vec![true; channels]);
        self
    }

    /// Add a capture switch with `channels` channels, initially off.
    pub fn capture_switch(mut self, channels: usize, exclusive: bool) -> Self {
        self.capture_switch = Some(vec![false; channels]);
        self.capture_exclusive = exclusive;
        self
    }

    /// Make the element enumerated with the given items.
    pub fn enumerated(mut self, items: &[&str], current: usize) -> Self {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        let current = current.min(items.len().saturating_sub(1));
        self.enumerated = Some((items, current));
        self
    }

    /// Allow only one open handle at a time.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    fn volume_caps(&self) -> Vec<VolumeCapability> {
        let mut caps = Vec::new();
        if let Some((_, channels)) = &self.playback {
            caps.push(VolumeCapability::PlaybackVolume);
            if channels.len() == 1 {
                caps.push(VolumeCapability::JoinedPlaybackVolume);
            }
        }
        if let Some((_, channels)) = &self.capture {
            caps.push(VolumeCapability::CaptureVolume);
            if channels.len() == 1 {
                caps.push(VolumeCapability::JoinedCaptureVolume);
            }
        }
        caps
    }

    fn switch_caps(&self) -> Vec<SwitchCapability> {
        let mut caps = Vec::new();
        if let Some(channels) = &self.playback_switch {
            caps.push(SwitchCapability::PlaybackMute);
            if channels.len() == 1 {
                caps.push(SwitchCapability::JoinedPlaybackMute);
            }
        }
        if let Some(channels) = &self.capture_switch {
            caps.push(SwitchCapability::CaptureMute);
            if channels.len() == 1 {
                caps.push(SwitchCapability::JoinedCaptureMute);
            }
            if self.capture_exclusive {
                caps.push(SwitchCapability::CaptureExclusive);
            }
        }
        caps
    }

    fn volume(&self, direction: StreamType) -> Option<&(VolumeRange, Vec<i64>)> {
        match direction {
            StreamType::Playback => self.playback.as_ref(),
            StreamType::Capture => self.capture.as_ref(),
        }
    }

    fn volume_mut(&mut self, direction: StreamType) -> Option<&mut (VolumeRange, Vec<i64>)> {
        match direction {
            StreamType::Playback => self.playback.as_mut(),
            StreamType::Capture => self.capture.as_mut(),
        }
    }

    fn switch_mut(&mut self, direction: StreamType) -> Option<&mut Vec<bool>> {
        match direction {
            StreamType::Playback => self.playback_switch.as_mut(),
            StreamType::Capture => self.capture_switch.as_mut(),
        }
    }
}

/// A scripted sound card.
#[derive(Debug, Clone)]
pub struct MockCard {
    info: CardInfo,
    elements: Vec<MockElement>,
}

impl MockCard {
    /// A card with no mixer elements.
    pub fn new(index: u32, id: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            info: CardInfo {
                index,
                id: id.into(),
                long_name: long_name.into(),
            },
            elements: Vec::new(),
        }
    }

    /// Add a mixer element.
    pub fn element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }
}

/// A scripted PCM device.
#[derive(Debug, Clone)]
pub struct MockPcm {
    name: String,
    card: Option<u32>,
    directions: Vec<StreamType>,
    channels: RangeInclusive<u32>,
    rates: Vec<u32>,
    formats: Vec<SampleFormat>,
    period: RangeInclusive<u64>,
    exclusive: bool,
}

impl MockPcm {
    /// A converting ("plug") device: any channel count from 1 to 32, common
    /// rates, every format.
    pub fn plug(name: impl Into<String>, card: Option<u32>) -> Self {
        Self {
            name: name.into(),
            card,
            directions: StreamType::ALL.to_vec(),
            channels: 1..=32,
            rates: vec![8000, 11025, 16000, 22050, 32000, 44100, 48000, 88200, 96000, 192000],
            formats: SampleFormat::ALL.to_vec(),
            period: 16..=65536,
            exclusive: false,
        }
    }

    /// A raw hardware device: exclusive, stereo, a few native formats.
    pub fn hardware(name: impl Into<String>, card: u32) -> Self {
        Self {
            name: name.into(),
            card: Some(card),
            directions: StreamType::ALL.to_vec(),
            channels: 2..=2,
            rates: vec![44100, 48000, 96000],
            formats: vec![SampleFormat::S16Le, SampleFormat::S32Le],
            period: 32..=8192,
            exclusive: true,
        }
    }

    /// Restrict the device to one direction.
    pub fn only(mut self, direction: StreamType) -> Self {
        self.directions = vec![direction];
        self
    }

    /// Replace the supported formats.
    pub fn formats(mut self, formats: &[SampleFormat]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    /// Replace the supported channel counts.
    pub fn channels(mut self, channels: RangeInclusive<u32>) -> Self {
        self.channels = channels;
        self
    }

    fn negotiate(&self, params: &StreamParams) -> AudioResult<StreamParams> {
        if !self.channels.contains(&params.channels) {
            return Err(AudioError::unsupported(
                "channels",
                params.channels,
                format!(
                    "{} supports {}..={}",
                    self.name,
                    self.channels.start(),
                    self.channels.end()
                ),
            ));
        }
        if !self.formats.contains(&params.format) {
            return Err(AudioError::unsupported(
                "format",
                params.format,
                format!("{} does not support it", self.name),
            ));
        }
        let rate = self
            .rates
            .iter()
            .copied()
            .min_by_key(|rate| rate.abs_diff(params.rate))
            .ok_or_else(|| AudioError::unsupported("rate", params.rate, "no rates available"))?;
        let period_size = params
            .period_size
            .clamp(*self.period.start(), *self.period.end());

        Ok(StreamParams {
            channels: params.channels,
            rate,
            format: params.format,
            period_size,
        })
    }
}

#[derive(Debug, Default)]
struct MockState {
    cards: Vec<MockCard>,
    pcms: Vec<MockPcm>,
    default_card: Option<u32>,
    held_elements: HashSet<(u32, MixerElementId)>,
    held_pcms: HashSet<(String, StreamType)>,
    injected_fault: Option<String>,
    device_calls: u64,
}

impl MockState {
    fn resolve(&self, scope: &CardSelector) -> AudioResult<Option<u32>> {
        let index = match scope {
            CardSelector::Default => return Ok(self.default_card),
            CardSelector::CardIndex(index) => Some(*index),
            CardSelector::Device(name) => self.resolve_device(name),
        };
        match index {
            Some(index) if self.card(index).is_some() => Ok(Some(index)),
            _ => Err(AudioError::unavailable(scope.device_name(), "no such card")),
        }
    }

    fn resolve_device(&self, name: &str) -> Option<u32> {
        if name == soundctl_types::DEFAULT_DEVICE {
            return self.default_card;
        }
        let card = name.strip_prefix("hw:")?;
        let card = card.strip_prefix("CARD=").unwrap_or(card);
        let card = card.split(',').next().unwrap_or(card);
        card.parse::<u32>().ok().or_else(|| {
            self.cards
                .iter()
                .find(|c| c.info.id == card)
                .map(|c| c.info.index)
        })
    }

    fn card(&self, index: u32) -> Option<&MockCard> {
        self.cards.iter().find(|c| c.info.index == index)
    }

    fn element(&self, card: u32, id: &MixerElementId) -> AudioResult<&MockElement> {
        self.card(card)
            .and_then(|c| c.elements.iter().find(|e| &e.id == id))
            .ok_or_else(|| AudioError::unavailable(format!("hw:{card}"), format!("no mixer {id}")))
    }

    fn element_mut(&mut self, card: u32, id: &MixerElementId) -> AudioResult<&mut MockElement> {
        self.cards
            .iter_mut()
            .find(|c| c.info.index == card)
            .and_then(|c| c.elements.iter_mut().find(|e| &e.id == id))
            .ok_or_else(|| AudioError::unavailable(format!("hw:{card}"), format!("no mixer {id}")))
    }

    fn pcm(&self, name: &str) -> Option<&MockPcm> {
        self.pcms.iter().find(|p| p.name == name)
    }

    fn card_name(&self, card: Option<u32>) -> String {
        card.and_then(|index| self.card(index))
            .map(|c| c.info.id.clone())
            .unwrap_or_default()
    }

    /// Count a device-level call and consume any injected fault.
    fn touch(&mut self) -> AudioResult<()> {
        self.device_calls += 1;
        match self.injected_fault.take() {
            Some(message) => Err(AudioError::DeviceError {
                message,
                errno: Some(5),
            }),
            None => Ok(()),
        }
    }
}

/// A scripted, in-memory sound backend.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// A host with no cards and no PCM devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// A representative host: an onboard card with the usual playback,
    /// capture and input-source elements, a USB headset, and the
    /// `default`, `null` and per-card hardware PCMs.
    pub fn demo() -> Self {
        let onboard = MockCard::new(0, "PCH", "HDA Intel PCH at 0xf7f10000 irq 32")
            .element(
                MockElement::new("Master", 0)
                    .playback_volume(VolumeRange::new(0, 87), 2, 65)
                    .playback_switch(2),
            )
            .element(
                MockElement::new("PCM", 0)
                    .playback_volume(VolumeRange::new(0, 255), 2, 255),
            )
            .element(
                MockElement::new("Capture", 0)
                    .capture_volume(VolumeRange::new(0, 63), 2, 40)
                    .capture_switch(2, false),
            )
            .element(
                MockElement::new("Capture", 1)
                    .capture_volume(VolumeRange::new(0, 63), 2, 0)
                    .capture_switch(2, false),
            )
            .element(MockElement::new("Input Source", 0).enumerated(
                &["Front Mic", "Rear Mic", "Line"],
                1,
            ))
            .element(
                MockElement::new("Auto-Mute Mode", 0).enumerated(&["Disabled", "Enabled"], 0),
            );

        let headset = MockCard::new(1, "Headset", "USB Audio Headset at usb-0000:00:14.0-2")
            .element(
                MockElement::new("Speaker", 0)
                    .playback_volume(VolumeRange::new(0, 37), 1, 30)
                    .playback_switch(1),
            )
            .element(
                MockElement::new("Mic", 0)
                    .capture_volume(VolumeRange::new(0, 16), 1, 12)
                    .capture_switch(1, true)
                    .exclusive(),
            );

        Self::with_host(
            vec![onboard, headset],
            vec![
                MockPcm::plug("null", None),
                MockPcm::plug("default", Some(0)),
                MockPcm::hardware("hw:CARD=PCH,DEV=0", 0),
                MockPcm::hardware("hw:CARD=Headset,DEV=0", 1).channels(1..=2),
                MockPcm::plug("plughw:CARD=Headset,DEV=0", Some(1)),
            ],
        )
    }

    /// A host with the given cards and PCM devices. The first card is the
    /// default card.
    pub fn with_host(cards: Vec<MockCard>, pcms: Vec<MockPcm>) -> Self {
        let default_card = cards.first().map(|c| c.info.index);
        let state = MockState {
            cards,
            pcms,
            default_card,
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Make the next device-level call fail with `DeviceError`.
    pub fn inject_fault(&self, message: impl Into<String>) {
        self.state.lock().injected_fault = Some(message.into());
    }

    /// Number of calls that reached an opened device.
    pub fn device_calls(&self) -> u64 {
        self.state.lock().device_calls
    }

    /// Number of exclusive mixer elements and PCMs currently held.
    pub fn held(&self) -> usize {
        let state = self.state.lock();
        state.held_elements.len() + state.held_pcms.len()
    }
}

impl SoundBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_cards(&self) -> AudioResult<Vec<CardInfo>> {
        Ok(self
            .state
            .lock()
            .cards
            .iter()
            .map(|c| c.info.clone())
            .collect())
    }

    fn list_mixer_elements(&self, scope: &CardSelector) -> AudioResult<Vec<MixerElementId>> {
        let state = self.state.lock();
        let Some(index) = state.resolve(scope)? else {
            return Ok(Vec::new());
        };
        Ok(state
            .card(index)
            .map(|c| c.elements.iter().map(|e| e.id.clone()).collect())
            .unwrap_or_default())
    }

    fn list_pcm_devices(&self, stream_type: StreamType) -> AudioResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .pcms
            .iter()
            .filter(|p| p.directions.contains(&stream_type))
            .map(|p| p.name.clone())
            .collect())
    }

    fn open_mixer(
        &self,
        scope: &CardSelector,
        element: &MixerElementId,
    ) -> AudioResult<Box<dyn MixerDevice>> {
        let mut state = self.state.lock();
        let card = state
            .resolve(scope)?
            .ok_or_else(|| AudioError::unavailable(scope.device_name(), "no default card"))?;
        let exclusive = state.element(card, element)?.exclusive;

        if exclusive && !state.held_elements.insert((card, element.clone())) {
            return Err(AudioError::unavailable(
                format!("hw:{card}"),
                format!("mixer {element} is busy"),
            ));
        }

        trace!(card, %element, exclusive, "Mock mixer opened");
        Ok(Box::new(MockMixer {
            state: Arc::clone(&self.state),
            device: scope.device_name(),
            card,
            id: element.clone(),
            exclusive,
        }))
    }

    fn open_pcm(
        &self,
        device: &str,
        stream_type: StreamType,
        mode: StreamMode,
    ) -> AudioResult<Box<dyn PcmDevice>> {
        let mut state = self.state.lock();
        let pcm = state
            .pcm(device)
            .filter(|p| p.directions.contains(&stream_type))
            .cloned()
            .ok_or_else(|| {
                AudioError::unavailable(device, format!("no {stream_type} PCM with this name"))
            })?;

        if pcm.exclusive && !state.held_pcms.insert((pcm.name.clone(), stream_type)) {
            return Err(AudioError::unavailable(device, "device or resource busy"));
        }

        debug!(device, %stream_type, ?mode, "Mock PCM opened");
        Ok(Box::new(MockStream {
            state: Arc::clone(&self.state),
            pcm,
            stream_type,
        }))
    }
}

struct MockMixer {
    state: Arc<Mutex<MockState>>,
    device: String,
    card: u32,
    id: MixerElementId,
    exclusive: bool,
}

impl MockMixer {
    fn read<T>(&self, f: impl FnOnce(&MockState, &MockElement) -> T) -> AudioResult<T> {
        let mut state = self.state.lock();
        state.touch()?;
        let element = state.element(self.card, &self.id)?;
        Ok(f(&state, element))
    }

    fn write<T>(&self, f: impl FnOnce(&mut MockElement) -> AudioResult<T>) -> AudioResult<T> {
        let mut state = self.state.lock();
        state.touch()?;
        f(state.element_mut(self.card, &self.id)?)
    }
}

impl MixerDevice for MockMixer {
    fn card_name(&self) -> AudioResult<String> {
        self.read(|_, _| self.device.clone())
    }

    fn switch_capabilities(&self) -> AudioResult<Vec<SwitchCapability>> {
        self.read(|_, e| e.switch_caps())
    }

    fn volume_capabilities(&self) -> AudioResult<Vec<VolumeCapability>> {
        self.read(|_, e| e.volume_caps())
    }

    fn volume_range(&self, direction: StreamType) -> AudioResult<Option<VolumeRange>> {
        self.read(|_, e| e.volume(direction).map(|(range, _)| *range))
    }

    fn volumes(&self, direction: StreamType) -> AudioResult<Vec<i64>> {
        self.read(|_, e| {
            e.volume(direction)
                .map(|(_, values)| values.clone())
                .unwrap_or_default()
        })
    }

    fn set_volume(
        &mut self,
        direction: StreamType,
        channel: ChannelSelector,
        raw: i64,
    ) -> AudioResult<()> {
        let id = self.id.clone();
        self.write(|e| {
            let (range, values) = e.volume_mut(direction).ok_or_else(|| {
                AudioError::unsupported("volume", raw, format!("mixer {id} has no {direction} volume"))
            })?;
            let raw = if range.is_empty() {
                range.min
            } else {
                raw.clamp(range.min, range.max)
            };
            apply_channels(values, channel, raw, &id)
        })
    }

    fn switches(&self, direction: StreamType) -> AudioResult<Option<Vec<bool>>> {
        self.read(|_, e| match direction {
            StreamType::Playback => e.playback_switch.clone(),
            StreamType::Capture => e.capture_switch.clone(),
        })
    }

    fn set_switch(
        &mut self,
        direction: StreamType,
        channel: ChannelSelector,
        on: bool,
    ) -> AudioResult<()> {
        let id = self.id.clone();
        self.write(|e| {
            let values = e.switch_mut(direction).ok_or_else(|| {
                AudioError::unsupported("switch", on, format!("mixer {id} has no {direction} switch"))
            })?;
            apply_channels(values, channel, on, &id)
        })
    }

    fn enumerated(&self) -> AudioResult<Option<EnumeratedValue>> {
        self.read(|_, e| {
            e.enumerated.as_ref().map(|(items, current)| EnumeratedValue {
                current: items.get(*current).cloned().unwrap_or_default(),
                items: items.clone(),
            })
        })
    }

    fn close(&mut self) -> AudioResult<()> {
        let mut state = self.state.lock();
        if self.exclusive {
            state.held_elements.remove(&(self.card, self.id.clone()));
        }
        trace!(card = self.card, element = %self.id, "Mock mixer closed");
        Ok(())
    }
}

fn apply_channels<T: Copy>(
    values: &mut [T],
    channel: ChannelSelector,
    value: T,
    id: &MixerElementId,
) -> AudioResult<()> {
    if let ChannelSelector::Channel(c) = channel {
        if c as usize >= values.len() {
            return Err(AudioError::unsupported(
                "channel",
                c,
                format!("mixer {id} has {} channels", values.len()),
            ));
        }
    }
    for (i, slot) in values.iter_mut().enumerate() {
        if channel.includes(i as u32) {
            *slot = value;
        }
    }
    Ok(())
}

struct MockStream {
    state: Arc<Mutex<MockState>>,
    pcm: MockPcm,
    stream_type: StreamType,
}

impl PcmDevice for MockStream {
    fn card_name(&self) -> AudioResult<String> {
        let mut state = self.state.lock();
        state.touch()?;
        let name = state.card_name(self.pcm.card);
        if name.is_empty() {
            Ok(self.pcm.name.clone())
        } else {
            Ok(name)
        }
    }

    fn apply(&mut self, params: &StreamParams) -> AudioResult<StreamParams> {
        self.state.lock().touch()?;
        self.pcm.negotiate(params)
    }

    fn close(&mut self) -> AudioResult<()> {
        if self.pcm.exclusive {
            self.state
                .lock()
                .held_pcms
                .remove(&(self.pcm.name.clone(), self.stream_type));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_resolution() {
        let backend = MockBackend::demo();
        let state = backend.state.lock();
        assert_eq!(state.resolve(&CardSelector::Default).unwrap(), Some(0));
        assert_eq!(state.resolve(&CardSelector::CardIndex(1)).unwrap(), Some(1));
        assert_eq!(
            state.resolve(&CardSelector::Device("hw:CARD=Headset,DEV=0".into())).unwrap(),
            Some(1)
        );
        assert_eq!(
            state.resolve(&CardSelector::Device("hw:0".into())).unwrap(),
            Some(0)
        );
        assert!(state.resolve(&CardSelector::CardIndex(7)).is_err());
        assert!(state.resolve(&CardSelector::Device("bogus".into())).is_err());
    }

    #[test]
    fn test_empty_host_default_scope() {
        let backend = MockBackend::new();
        assert!(backend.list_cards().unwrap().is_empty());
        assert!(backend
            .list_mixer_elements(&CardSelector::Default)
            .unwrap()
            .is_empty());
        assert!(backend.list_pcm_devices(StreamType::Capture).unwrap().is_empty());
    }

    #[test]
    fn test_negotiate_nearest_rate_and_period() {
        let pcm = MockPcm::hardware("hw:0", 0);
        let params = StreamParams {
            rate: 44000,
            period_size: 4,
            ..StreamParams::default()
        };
        let applied = pcm.negotiate(&params).unwrap();
        assert_eq!(applied.rate, 44100);
        assert_eq!(applied.period_size, 32);
    }

    #[test]
    fn test_negotiate_rejects_format() {
        let pcm = MockPcm::hardware("hw:0", 0);
        let params = StreamParams::calibration();
        let err = pcm.negotiate(&params).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedParameter);
    }

    #[test]
    fn test_exclusive_pcm_released_on_close() {
        let backend = MockBackend::demo();
        let mut first = backend
            .open_pcm("hw:CARD=PCH,DEV=0", StreamType::Playback, StreamMode::Normal)
            .unwrap();
        assert!(backend
            .open_pcm("hw:CARD=PCH,DEV=0", StreamType::Playback, StreamMode::Normal)
            .is_err());
        assert_eq!(backend.held(), 1);

        first.close().unwrap();
        assert_eq!(backend.held(), 0);
        assert!(backend
            .open_pcm("hw:CARD=PCH,DEV=0", StreamType::Playback, StreamMode::Normal)
            .is_ok());
    }

    #[test]
    fn test_injected_fault_fires_once() {
        let backend = MockBackend::demo();
        let mixer = backend
            .open_mixer(&CardSelector::Default, &MixerElementId::new("Master", 0))
            .unwrap();
        backend.inject_fault("I/O error");
        let err = mixer.card_name().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DeviceError);
        assert_eq!(mixer.card_name().unwrap(), "default");
    }

    #[test]
    fn test_empty_volume_range_pins_to_min() {
        let card = MockCard::new(0, "Odd", "Odd card")
            .element(MockElement::new("Bad", 0).playback_volume(VolumeRange::new(10, 0), 1, 5));
        let backend = MockBackend::with_host(vec![card], Vec::new());
        let mut mixer = backend
            .open_mixer(&CardSelector::CardIndex(0), &MixerElementId::new("Bad", 0))
            .unwrap();

        mixer
            .set_volume(StreamType::Playback, ChannelSelector::All, 50)
            .unwrap();
        assert_eq!(mixer.volumes(StreamType::Playback).unwrap(), vec![10]);
    }

    #[test]
    fn test_mono_elements_report_joined_caps() {
        let backend = MockBackend::demo();
        let speaker = backend
            .open_mixer(&CardSelector::CardIndex(1), &MixerElementId::new("Speaker", 0))
            .unwrap();
        assert_eq!(
            speaker.volume_capabilities().unwrap(),
            vec![VolumeCapability::PlaybackVolume, VolumeCapability::JoinedPlaybackVolume]
        );
        assert_eq!(
            speaker.switch_capabilities().unwrap(),
            vec![SwitchCapability::PlaybackMute, SwitchCapability::JoinedPlaybackMute]
        );

        let master = backend
            .open_mixer(&CardSelector::Default, &MixerElementId::new("Master", 0))
            .unwrap();
        let caps = master.volume_capabilities().unwrap();
        assert!(!caps.contains(&VolumeCapability::Volume));
        assert!(!caps.contains(&VolumeCapability::JoinedVolume));
    }
}
