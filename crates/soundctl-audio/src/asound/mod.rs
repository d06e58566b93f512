//! Native ALSA backend.

mod mixer;
mod pcm;

use tracing::{debug, instrument, warn};

use alsa::card::{Card, Iter as CardIter};
use alsa::ctl::Ctl;
use alsa::device_name::HintIter;
use alsa::mixer::{Mixer, Selem};
use alsa::Direction;

use soundctl_types::{CardInfo, CardSelector, MixerElementId, StreamMode, StreamType};

use crate::backend::{MixerDevice, PcmDevice, SoundBackend};
use crate::error::AudioError;
use crate::AudioResult;

use self::mixer::AlsaMixer;
use self::pcm::AlsaPcm;

// errno values from <asm-generic/errno-base.h>
const EPERM: i32 = 1;
const ENOENT: i32 = 2;
const ENXIO: i32 = 6;
const EAGAIN: i32 = 11;
const EACCES: i32 = 13;
const EBUSY: i32 = 16;
const ENODEV: i32 = 19;
const EINVAL: i32 = 22;

/// Sound backend over libasound.
#[derive(Debug, Default)]
pub struct AlsaBackend;

impl AlsaBackend {
    /// Create the backend. No device is touched until enumeration or open.
    pub fn new() -> Self {
        Self
    }
}

impl SoundBackend for AlsaBackend {
    fn name(&self) -> &'static str {
        "ALSA"
    }

    #[instrument(name = "alsa_list_cards", skip(self))]
    fn list_cards(&self) -> AudioResult<Vec<CardInfo>> {
        let mut cards = Vec::new();

        for card in CardIter::new() {
            let card = card?;
            let index = match u32::try_from(card.get_index()) {
                Ok(index) => index,
                Err(_) => continue,
            };
            let long_name = card.get_longname().unwrap_or_default();
            let id = card_id(&card).unwrap_or_else(|| format!("card{index}"));
            cards.push(CardInfo {
                index,
                id,
                long_name,
            });
        }

        Ok(cards)
    }

    #[instrument(name = "alsa_list_mixers", skip(self))]
    fn list_mixer_elements(&self, scope: &CardSelector) -> AudioResult<Vec<MixerElementId>> {
        // With no cards there is no default mixer to attach to.
        if *scope == CardSelector::Default && CardIter::new().next().is_none() {
            debug!("No cards present");
            return Ok(Vec::new());
        }

        let device = scope.device_name();
        let mixer = Mixer::new(&device, false).map_err(|e| open_error(&device, e))?;

        let mut elements = Vec::new();
        for elem in mixer.iter() {
            let Some(selem) = Selem::new(elem) else {
                continue;
            };
            let id = selem.get_id();
            match id.get_name() {
                Ok(name) => elements.push(MixerElementId::new(name, id.get_index())),
                Err(e) => warn!(error = %e, "Skipping mixer element with unreadable name"),
            }
        }

        Ok(elements)
    }

    #[instrument(name = "alsa_list_pcms", skip(self))]
    fn list_pcm_devices(&self, stream_type: StreamType) -> AudioResult<Vec<String>> {
        let hints = HintIter::new_str(None, "pcm")?;

        Ok(hints
            .filter(|hint| match (hint.direction.as_ref(), stream_type) {
                (None, _) => true,
                (Some(Direction::Playback), StreamType::Playback) => true,
                (Some(Direction::Capture), StreamType::Capture) => true,
                _ => false,
            })
            .filter_map(|hint| hint.name)
            .collect())
    }

    fn open_mixer(
        &self,
        scope: &CardSelector,
        element: &MixerElementId,
    ) -> AudioResult<Box<dyn MixerDevice>> {
        Ok(Box::new(AlsaMixer::open(scope, element)?))
    }

    fn open_pcm(
        &self,
        device: &str,
        stream_type: StreamType,
        mode: StreamMode,
    ) -> AudioResult<Box<dyn PcmDevice>> {
        Ok(Box::new(AlsaPcm::open(device, stream_type, mode)?))
    }
}

/// Short card identifier from the control interface (e.g. "PCH").
fn card_id(card: &Card) -> Option<String> {
    let ctl = Ctl::from_card(card, false).ok()?;
    let info = ctl.card_info().ok()?;
    info.get_id().ok().map(str::to_string)
}

/// Card name for a card index, falling back to `fallback`.
fn card_name(index: i32, fallback: &str) -> String {
    if index < 0 {
        return fallback.to_string();
    }
    let card = Card::new(index);
    card_id(&card)
        .or_else(|| card.get_name().ok())
        .unwrap_or_else(|| fallback.to_string())
}

fn errno(err: &alsa::Error) -> i32 {
    err.errno().abs()
}

/// Map a failure to open `device`.
fn open_error(device: &str, err: alsa::Error) -> AudioError {
    match errno(&err) {
        EPERM | ENOENT | ENXIO | EAGAIN | EACCES | EBUSY | ENODEV => {
            AudioError::unavailable(device, err.to_string())
        }
        _ => AudioError::from(err),
    }
}

/// Map a failure to set a hardware parameter.
fn param_error(parameter: &'static str, value: impl std::fmt::Display, err: alsa::Error) -> AudioError {
    if errno(&err) == EINVAL {
        AudioError::unsupported(parameter, value, err.to_string())
    } else {
        AudioError::from(err)
    }
}

impl From<alsa::Error> for AudioError {
    fn from(err: alsa::Error) -> Self {
        Self::DeviceError {
            message: err.to_string(),
            errno: Some(errno(&err)),
        }
    }
}
