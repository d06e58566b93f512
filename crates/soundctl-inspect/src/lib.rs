//! Capability inspector and self-test.
//!
//! [`Inspector`] walks every scope of a sound backend, opens each mixer
//! element and PCM device, runs the reader operations and collects the
//! results into an [`InspectionReport`]. [`SelfTest`] checks the handle
//! lifecycle guarantees against the same backend.

mod inspector;
mod report;
mod selftest;
mod stats;

pub use inspector::{InspectOptions, Inspector};
pub use report::{
    InspectionReport, MixerReport, OpRecord, RecordedError, ScopeError, StreamReport,
};
pub use selftest::{CheckOutcome, CheckStatus, SelfTest, SelfTestReport};
pub use stats::ReportStats;

use soundctl_audio::AudioError;
use thiserror::Error;

/// Errors that abort an inspection run.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("card enumeration failed: {0}")]
    Enumeration(#[from] AudioError),
}

pub type InspectResult<T> = Result<T, InspectError>;
