//! Shared value types for the soundctl ALSA binding.
//!
//! This crate defines the selectors, stream parameters, mixer capability
//! sets and operation tables shared by the binding, the inspector and the
//! command-line tool. It performs no I/O.

mod mixer;
mod ops;
mod types;

pub use mixer::{
    ChannelSelector, EnumeratedValue, MixerElementId, SwitchCapability, VolumeCapability,
    VolumeRange,
};
pub use ops::{MixerOp, OpOutput, StreamOp};
pub use types::{CardInfo, CardSelector, SampleFormat, StreamMode, StreamParams, StreamType};

use thiserror::Error;

/// Errors from parsing selectors and names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An empty card selector.
    #[error("card selector must not be empty")]
    EmptySelector,

    /// An unrecognised sample format name.
    #[error("unknown sample format: {0}")]
    UnknownFormat(String),

    /// An unrecognised stream direction.
    #[error("unknown stream type: {0}")]
    UnknownStreamType(String),
}

/// Default ALSA device string.
pub const DEFAULT_DEVICE: &str = "default";
