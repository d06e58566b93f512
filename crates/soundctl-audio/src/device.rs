//! Sound device enumeration.

use tracing::{debug, instrument};

use soundctl_types::{CardInfo, CardSelector, MixerElementId, StreamType};

use crate::backend::SoundBackend;
use crate::AudioResult;

/// Enumerate the cards present on the host. Empty when there are none.
#[instrument(name = "list_cards", skip(backend), fields(backend = backend.name()))]
pub fn list_cards(backend: &dyn SoundBackend) -> AudioResult<Vec<CardInfo>> {
    let cards = backend.list_cards()?;
    debug!(count = cards.len(), "Enumerated cards");
    Ok(cards)
}

/// Enumerate the simple mixer element names in `scope`.
///
/// Elements sharing a name (distinguished by index) appear once each.
pub fn list_mixers(backend: &dyn SoundBackend, scope: &CardSelector) -> AudioResult<Vec<String>> {
    Ok(list_mixer_ids(backend, scope)?
        .into_iter()
        .map(|id| id.name)
        .collect())
}

/// Enumerate the simple mixer elements in `scope`, with their indices.
#[instrument(name = "list_mixers", skip(backend), fields(backend = backend.name()))]
pub fn list_mixer_ids(
    backend: &dyn SoundBackend,
    scope: &CardSelector,
) -> AudioResult<Vec<MixerElementId>> {
    let elements = backend.list_mixer_elements(scope)?;
    debug!(count = elements.len(), "Enumerated mixer elements");
    Ok(elements)
}

/// Enumerate PCM device names for the given direction.
#[instrument(name = "list_stream_devices", skip(backend), fields(backend = backend.name()))]
pub fn list_stream_devices(
    backend: &dyn SoundBackend,
    stream_type: StreamType,
) -> AudioResult<Vec<String>> {
    let devices = backend.list_pcm_devices(stream_type)?;
    debug!(count = devices.len(), "Enumerated PCM devices");
    Ok(devices)
}

/// The default scope followed by one scope per card.
pub fn all_scopes(backend: &dyn SoundBackend) -> AudioResult<Vec<CardSelector>> {
    let mut scopes = vec![CardSelector::Default];
    scopes.extend(list_cards(backend)?.iter().map(CardInfo::selector));
    Ok(scopes)
}
