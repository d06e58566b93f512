//! PCM stream handles.

use tracing::{debug, info, instrument, warn};

use soundctl_types::{CardSelector, SampleFormat, StreamMode, StreamParams, StreamType};

use crate::backend::{PcmDevice, SoundBackend};
use crate::error::AudioError;
use crate::handle::Lifecycle;
use crate::AudioResult;

/// An open playback or capture PCM stream.
///
/// Configuration is write-only: every setter re-applies the full parameter
/// bundle to the device and keeps what the driver accepted.
pub struct StreamHandle {
    device_name: String,
    stream_type: StreamType,
    mode: StreamMode,
    params: StreamParams,
    device: Lifecycle<Box<dyn PcmDevice>>,
}

impl StreamHandle {
    /// Open a blocking stream on `scope` with default parameters.
    pub fn open(
        backend: &dyn SoundBackend,
        stream_type: StreamType,
        scope: &CardSelector,
    ) -> AudioResult<Self> {
        Self::open_with(backend, stream_type, StreamMode::Normal, scope, StreamParams::default())
    }

    /// Open a stream and apply `params`.
    #[instrument(name = "stream_open", skip(backend), fields(backend = backend.name()))]
    pub fn open_with(
        backend: &dyn SoundBackend,
        stream_type: StreamType,
        mode: StreamMode,
        scope: &CardSelector,
        params: StreamParams,
    ) -> AudioResult<Self> {
        let device_name = scope.device_name();
        let mut device = backend.open_pcm(&device_name, stream_type, mode)?;

        let applied = match device.apply(&params) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(device = %device_name, error = %e, "Initial parameters rejected");
                let _ = device.close();
                return Err(e);
            }
        };

        debug!(device = %device_name, ?applied, "PCM stream opened");

        Ok(Self {
            device_name,
            stream_type,
            mode,
            params: applied,
            device: Lifecycle::open(device, "PCM"),
        })
    }

    /// Release the stream. Fails with `InvalidState` if already closed.
    #[instrument(name = "stream_close", skip(self), fields(device = %self.device_name))]
    pub fn close(&mut self) -> AudioResult<()> {
        let mut device = self.device.take("close")?;
        device.close()?;
        info!("PCM stream closed");
        Ok(())
    }

    /// Returns true until [`StreamHandle::close`] succeeds.
    pub fn is_open(&self) -> bool {
        self.device.is_open()
    }

    /// The ALSA device string this stream was opened on.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Direction of the stream.
    pub fn stream_type(&self) -> AudioResult<StreamType> {
        self.device.get("pcmtype")?;
        Ok(self.stream_type)
    }

    /// Open mode of the stream.
    pub fn stream_mode(&self) -> AudioResult<StreamMode> {
        self.device.get("pcmmode")?;
        Ok(self.mode)
    }

    /// Name of the card the stream is open on.
    pub fn card_name(&self) -> AudioResult<String> {
        self.device.get("cardname")?.card_name()
    }

    /// The parameters last accepted by the driver.
    pub fn params(&self) -> AudioResult<StreamParams> {
        self.device.get("params")?;
        Ok(self.params)
    }

    /// Set the channel count.
    pub fn set_channels(&mut self, channels: u32) -> AudioResult<u32> {
        if channels == 0 {
            self.device.get("setchannels")?;
            return Err(AudioError::unsupported("channels", channels, "must be at least 1"));
        }
        let params = StreamParams {
            channels,
            ..self.params
        };
        Ok(self.reconfigure("setchannels", params)?.channels)
    }

    /// Set the sample rate. Returns the rate the driver chose.
    pub fn set_rate(&mut self, rate: u32) -> AudioResult<u32> {
        if rate == 0 {
            self.device.get("setrate")?;
            return Err(AudioError::unsupported("rate", rate, "must be positive"));
        }
        let params = StreamParams { rate, ..self.params };
        Ok(self.reconfigure("setrate", params)?.rate)
    }

    /// Set the sample format.
    pub fn set_format(&mut self, format: SampleFormat) -> AudioResult<SampleFormat> {
        let params = StreamParams {
            format,
            ..self.params
        };
        Ok(self.reconfigure("setformat", params)?.format)
    }

    /// Set the period size in frames. Returns the size the driver chose.
    pub fn set_period_size(&mut self, period_size: u64) -> AudioResult<u64> {
        if period_size == 0 {
            self.device.get("setperiodsize")?;
            return Err(AudioError::unsupported(
                "period size",
                period_size,
                "must be at least 1 frame",
            ));
        }
        let params = StreamParams {
            period_size,
            ..self.params
        };
        Ok(self.reconfigure("setperiodsize", params)?.period_size)
    }

    /// Apply `params`; on failure the stored parameters stay unchanged.
    #[instrument(skip(self), fields(device = %self.device_name))]
    fn reconfigure(
        &mut self,
        operation: &'static str,
        params: StreamParams,
    ) -> AudioResult<StreamParams> {
        let device = self.device.get_mut(operation)?;
        let applied = device.apply(&params)?;
        if applied != params {
            debug!(requested = ?params, ?applied, "Driver adjusted parameters");
        }
        self.params = applied;
        Ok(applied)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        if let Some(mut device) = self.device.take_if_open() {
            let _ = device.close();
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("device", &self.device_name)
            .field("stream_type", &self.stream_type)
            .field("mode", &self.mode)
            .field("params", &self.params)
            .field("open", &self.is_open())
            .finish()
    }
}
