//! Error types for the audio module.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during device and handle operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The device or mixer element does not exist or cannot be acquired.
    #[error("Device unavailable: {device}: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    /// An operation was attempted on a closed handle.
    #[error("{operation} on closed {handle}")]
    InvalidState {
        operation: &'static str,
        handle: &'static str,
    },

    /// The driver rejected a requested parameter value.
    #[error("Unsupported {parameter} {value}: {reason}")]
    UnsupportedParameter {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    /// Any other failure reported by the sound stack.
    #[error("Device error: {message}")]
    DeviceError { message: String, errno: Option<i32> },
}

/// The four error kinds, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DeviceUnavailable,
    InvalidState,
    UnsupportedParameter,
    DeviceError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeviceUnavailable => "DeviceUnavailable",
            Self::InvalidState => "InvalidState",
            Self::UnsupportedParameter => "UnsupportedParameter",
            Self::DeviceError => "DeviceError",
        };
        f.write_str(name)
    }
}

impl AudioError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DeviceUnavailable { .. } => ErrorKind::DeviceUnavailable,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::UnsupportedParameter { .. } => ErrorKind::UnsupportedParameter,
            Self::DeviceError { .. } => ErrorKind::DeviceError,
        }
    }

    /// Shorthand for [`AudioError::DeviceUnavailable`].
    pub fn unavailable(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AudioError::UnsupportedParameter`].
    pub fn unsupported(
        parameter: &'static str,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedParameter {
            parameter,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AudioError::DeviceError`] without an errno.
    pub fn device(message: impl Into<String>) -> Self {
        Self::DeviceError {
            message: message.into(),
            errno: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_message() {
        let err = AudioError::InvalidState {
            operation: "getvolume",
            handle: "mixer",
        };
        assert_eq!(err.to_string(), "getvolume on closed mixer");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            AudioError::unavailable("hw:9", "no such card").kind(),
            ErrorKind::DeviceUnavailable
        );
        assert_eq!(
            AudioError::unsupported("rate", 1, "out of range").kind(),
            ErrorKind::UnsupportedParameter
        );
        assert_eq!(AudioError::device("io").kind(), ErrorKind::DeviceError);
    }
}
