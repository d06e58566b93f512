//! Sound backend abstraction.
//!
//! The handles in this crate never talk to a sound stack directly. They go
//! through [`SoundBackend`] for discovery and opening, and through the
//! [`MixerDevice`] / [`PcmDevice`] objects it returns for everything else.
//!
//! This file must not contain platform-specific imports; those belong in the
//! backend implementations.

use std::sync::Arc;

use soundctl_types::{
    CardInfo, CardSelector, ChannelSelector, EnumeratedValue, MixerElementId, StreamMode,
    StreamParams, StreamType, SwitchCapability, VolumeCapability, VolumeRange,
};

use crate::AudioResult;

/// Discovery and open entry points of a sound stack.
pub trait SoundBackend: Send + Sync {
    /// Backend name (e.g. "ALSA", "mock").
    fn name(&self) -> &'static str;

    /// Enumerate the cards present on the host.
    fn list_cards(&self) -> AudioResult<Vec<CardInfo>>;

    /// Enumerate the simple mixer elements in `scope`.
    fn list_mixer_elements(&self, scope: &CardSelector) -> AudioResult<Vec<MixerElementId>>;

    /// Enumerate PCM device names usable in `stream_type` direction.
    fn list_pcm_devices(&self, stream_type: StreamType) -> AudioResult<Vec<String>>;

    /// Open a mixer element.
    fn open_mixer(
        &self,
        scope: &CardSelector,
        element: &MixerElementId,
    ) -> AudioResult<Box<dyn MixerDevice>>;

    /// Open a PCM device.
    fn open_pcm(
        &self,
        device: &str,
        stream_type: StreamType,
        mode: StreamMode,
    ) -> AudioResult<Box<dyn PcmDevice>>;
}

/// An acquired simple mixer element.
///
/// Volumes are raw driver values; percentage conversion happens in
/// [`crate::MixerHandle`].
pub trait MixerDevice {
    /// Name of the card the element belongs to.
    fn card_name(&self) -> AudioResult<String>;

    /// Switch capabilities, in display order.
    fn switch_capabilities(&self) -> AudioResult<Vec<SwitchCapability>>;

    /// Volume capabilities, in display order.
    fn volume_capabilities(&self) -> AudioResult<Vec<VolumeCapability>>;

    /// Raw volume range, or `None` when there is no volume in `direction`.
    fn volume_range(&self, direction: StreamType) -> AudioResult<Option<VolumeRange>>;

    /// Raw per-channel volumes in `direction`. Empty when there is no volume.
    fn volumes(&self, direction: StreamType) -> AudioResult<Vec<i64>>;

    /// Set the raw volume of the selected channels.
    fn set_volume(
        &mut self,
        direction: StreamType,
        channel: ChannelSelector,
        raw: i64,
    ) -> AudioResult<()>;

    /// Per-channel switch states, or `None` when there is no switch in
    /// `direction`. `true` means the switch is on (unmuted / recording).
    fn switches(&self, direction: StreamType) -> AudioResult<Option<Vec<bool>>>;

    /// Set the switch of the selected channels.
    fn set_switch(
        &mut self,
        direction: StreamType,
        channel: ChannelSelector,
        on: bool,
    ) -> AudioResult<()>;

    /// Current item and item list, or `None` for non-enumerated elements.
    fn enumerated(&self) -> AudioResult<Option<EnumeratedValue>>;

    /// Release the element.
    fn close(&mut self) -> AudioResult<()>;
}

/// An acquired PCM device.
pub trait PcmDevice {
    /// Name of the card the stream is open on.
    fn card_name(&self) -> AudioResult<String>;

    /// Apply a full parameter bundle. Returns the parameters the driver
    /// actually chose, which may differ for rate and period size.
    fn apply(&mut self, params: &StreamParams) -> AudioResult<StreamParams>;

    /// Release the device.
    fn close(&mut self) -> AudioResult<()>;
}

/// Create the native backend for the current platform.
pub fn create_backend() -> AudioResult<Arc<dyn SoundBackend>> {
    #[cfg(all(target_os = "linux", feature = "alsa"))]
    {
        Ok(Arc::new(crate::asound::AlsaBackend::new()))
    }

    #[cfg(not(all(target_os = "linux", feature = "alsa")))]
    {
        Err(crate::AudioError::unavailable(
            "native",
            "no native sound backend compiled in (enable the `alsa` feature on Linux)",
        ))
    }
}
