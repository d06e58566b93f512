//! ALSA device enumeration, mixer and PCM handles.
//!
//! This crate wraps a sound stack behind [`SoundBackend`] and exposes two
//! handle types with a strict open-once/close-once lifecycle:
//! [`MixerHandle`] for simple mixer elements and [`StreamHandle`] for PCM
//! streams. Any operation on a closed handle fails with
//! [`AudioError::InvalidState`] without reaching the backend.

mod backend;
mod device;
mod dispatch;
mod error;
mod handle;
mod mixer;
mod mock;
mod stream;

#[cfg(all(target_os = "linux", feature = "alsa"))]
mod asound;

#[cfg(all(target_os = "linux", feature = "alsa"))]
pub use asound::AlsaBackend;
pub use backend::{create_backend, MixerDevice, PcmDevice, SoundBackend};
pub use device::{all_scopes, list_cards, list_mixer_ids, list_mixers, list_stream_devices};
pub use dispatch::{apply_mixer_op, apply_stream_op, run_mixer_ops, run_stream_ops};
pub use error::{AudioError, ErrorKind};
pub use mixer::MixerHandle;
pub use mock::{MockBackend, MockCard, MockElement, MockPcm};
pub use stream::StreamHandle;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;
