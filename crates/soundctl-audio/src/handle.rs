//! Open/closed lifecycle shared by mixer and stream handles.

use crate::error::AudioError;
use crate::AudioResult;

/// Holds a backend device while the handle is open.
///
/// Open -> Closed is the only transition. Once closed the device is gone, so
/// no operation on a closed handle can reach the backend.
pub(crate) struct Lifecycle<D> {
    device: Option<D>,
    kind: &'static str,
}

impl<D> Lifecycle<D> {
    pub(crate) fn open(device: D, kind: &'static str) -> Self {
        Self {
            device: Some(device),
            kind,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.device.is_some()
    }

    pub(crate) fn get(&self, operation: &'static str) -> AudioResult<&D> {
        self.device.as_ref().ok_or(AudioError::InvalidState {
            operation,
            handle: self.kind,
        })
    }

    pub(crate) fn get_mut(&mut self, operation: &'static str) -> AudioResult<&mut D> {
        let kind = self.kind;
        self.device.as_mut().ok_or(AudioError::InvalidState {
            operation,
            handle: kind,
        })
    }

    /// Move to Closed, returning the device for release. A second call fails.
    pub(crate) fn take(&mut self, operation: &'static str) -> AudioResult<D> {
        self.device.take().ok_or(AudioError::InvalidState {
            operation,
            handle: self.kind,
        })
    }

    /// Move to Closed without failing if already closed.
    pub(crate) fn take_if_open(&mut self) -> Option<D> {
        self.device.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_lifecycle_transitions_once() {
        let mut lifecycle = Lifecycle::open(5u8, "mixer");
        assert!(lifecycle.is_open());
        assert_eq!(*lifecycle.get("read").unwrap(), 5);

        assert_eq!(lifecycle.take("close").unwrap(), 5);
        assert!(!lifecycle.is_open());

        let err = lifecycle.get("read").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.to_string(), "read on closed mixer");

        assert!(lifecycle.take("close").is_err());
        assert!(lifecycle.get_mut("write").is_err());
        assert!(lifecycle.take_if_open().is_none());
    }
}
