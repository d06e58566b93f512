//! ALSA PCM devices.

use alsa::pcm::{Access, Format, Frames, HwParams, PCM};
use alsa::{Direction, ValueOr};
use tracing::{debug, trace};

use soundctl_types::{SampleFormat, StreamMode, StreamParams, StreamType};

use crate::backend::PcmDevice;
use crate::AudioResult;

use super::{card_name, open_error, param_error};

pub(super) struct AlsaPcm {
    pcm: PCM,
    device: String,
}

impl AlsaPcm {
    pub(super) fn open(device: &str, stream_type: StreamType, mode: StreamMode) -> AudioResult<Self> {
        let direction = match stream_type {
            StreamType::Playback => Direction::Playback,
            StreamType::Capture => Direction::Capture,
        };
        let pcm = PCM::new(device, direction, mode.is_nonblocking())
            .map_err(|e| open_error(device, e))?;

        debug!(device, %stream_type, ?mode, "ALSA PCM opened");
        Ok(Self {
            pcm,
            device: device.to_string(),
        })
    }
}

fn alsa_format(format: SampleFormat) -> Format {
    match format {
        SampleFormat::S8 => Format::S8,
        SampleFormat::U8 => Format::U8,
        SampleFormat::S16Le => Format::S16LE,
        SampleFormat::S16Be => Format::S16BE,
        SampleFormat::U16Le => Format::U16LE,
        SampleFormat::U16Be => Format::U16BE,
        SampleFormat::S24Le => Format::S24LE,
        SampleFormat::S24Be => Format::S24BE,
        SampleFormat::U24Le => Format::U24LE,
        SampleFormat::U24Be => Format::U24BE,
        SampleFormat::S32Le => Format::S32LE,
        SampleFormat::S32Be => Format::S32BE,
        SampleFormat::U32Le => Format::U32LE,
        SampleFormat::U32Be => Format::U32BE,
        SampleFormat::FloatLe => Format::FloatLE,
        SampleFormat::FloatBe => Format::FloatBE,
        SampleFormat::Float64Le => Format::Float64LE,
        SampleFormat::Float64Be => Format::Float64BE,
        SampleFormat::MuLaw => Format::MuLaw,
        SampleFormat::ALaw => Format::ALaw,
        SampleFormat::ImaAdpcm => Format::ImaAdPCM,
        SampleFormat::Mpeg => Format::MPEG,
        SampleFormat::Gsm => Format::GSM,
    }
}

impl PcmDevice for AlsaPcm {
    fn card_name(&self) -> AudioResult<String> {
        let info = self.pcm.info()?;
        Ok(card_name(info.get_card(), &self.device))
    }

    fn apply(&mut self, params: &StreamParams) -> AudioResult<StreamParams> {
        let hwp = HwParams::any(&self.pcm)?;
        hwp.set_access(Access::RWInterleaved)?;
        hwp.set_channels(params.channels)
            .map_err(|e| param_error("channels", params.channels, e))?;
        hwp.set_format(alsa_format(params.format))
            .map_err(|e| param_error("format", params.format, e))?;
        hwp.set_rate_near(params.rate, ValueOr::Nearest)
            .map_err(|e| param_error("rate", params.rate, e))?;

        let requested = Frames::try_from(params.period_size).unwrap_or(Frames::MAX);
        let period = hwp
            .set_period_size_near(requested, ValueOr::Nearest)
            .map_err(|e| param_error("period size", params.period_size, e))?;

        self.pcm
            .hw_params(&hwp)
            .map_err(|e| param_error("hardware parameters", params.rate, e))?;

        let rate = hwp.get_rate()?;
        let applied = StreamParams {
            channels: params.channels,
            rate,
            format: params.format,
            period_size: u64::try_from(period).unwrap_or_default(),
        };
        trace!(device = %self.device, ?applied, "ALSA hardware parameters applied");
        Ok(applied)
    }

    fn close(&mut self) -> AudioResult<()> {
        trace!(device = %self.device, "ALSA PCM released");
        Ok(())
    }
}
