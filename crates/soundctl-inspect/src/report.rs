//! Serialisable inspection results.

use serde::{Deserialize, Serialize};

use soundctl_audio::AudioError;
use soundctl_types::{CardInfo, MixerElementId, OpOutput, StreamParams, StreamType};

use crate::stats::ReportStats;

/// A failure recorded in a report instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// Error category, e.g. "DeviceUnavailable".
    pub kind: String,
    pub message: String,
}

impl From<&AudioError> for RecordedError {
    fn from(error: &AudioError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of one operation on an open handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpRecord {
    /// Short operation name (`getvolume`, `pcmtype`, ...).
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OpOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordedError>,
}

impl OpRecord {
    pub(crate) fn new(op: &str, result: Result<OpOutput, AudioError>) -> Self {
        match result {
            Ok(output) => Self {
                op: op.to_string(),
                output: Some(output),
                error: None,
            },
            Err(e) => Self {
                op: op.to_string(),
                output: None,
                error: Some(RecordedError::from(&e)),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One mixer element visited during inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixerReport {
    /// Selector the element was found under.
    pub scope: String,
    pub element: MixerElementId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_error: Option<RecordedError>,
    pub operations: Vec<OpRecord>,
}

/// One PCM device visited during inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamReport {
    pub device: String,
    pub direction: StreamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_error: Option<RecordedError>,
    /// Parameters the driver accepted at open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<StreamParams>,
    pub operations: Vec<OpRecord>,
}

/// A scope whose mixer list could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeError {
    pub scope: String,
    pub error: RecordedError,
}

/// Everything the inspector found on a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub backend: String,
    pub cards: Vec<CardInfo>,
    pub mixers: Vec<MixerReport>,
    pub streams: Vec<StreamReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope_errors: Vec<ScopeError>,
    pub stats: ReportStats,
}

impl InspectionReport {
    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.scope_errors.is_empty() && self.stats.failures() == 0
    }
}
