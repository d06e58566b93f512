//! `soundctl` command-line front end.

mod commands;
mod config;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundctl_audio::{create_backend, MockBackend, SoundBackend};
use soundctl_types::{
    CardSelector, ChannelSelector, MixerElementId, SampleFormat, StreamMode, StreamType,
};

pub use config::{Config, InspectConfig};

const DEFAULT_FILTER: &str = "soundctl=info,soundctl_audio=info,soundctl_inspect=info";
const VERBOSE_FILTER: &str = "soundctl=debug,soundctl_audio=debug,soundctl_inspect=debug";

#[derive(Parser, Debug)]
#[command(name = "soundctl", version, about = "Inspect and control ALSA sound cards")]
pub struct Cli {
    /// Sound backend to use
    #[arg(long, env = "SOUNDCTL_BACKEND", value_enum, default_value = "alsa", global = true)]
    backend: BackendKind,

    /// TOML configuration file
    #[arg(long, env = "SOUNDCTL_CONFIG", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Native ALSA
    Alsa,
    /// Scripted demo host
    Mock,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        self == Switch::On
    }
}

/// Card or device the command applies to.
#[derive(Args, Debug, Clone, Default)]
struct ScopeArgs {
    /// Card index
    #[arg(short = 'c', long, env = "SOUNDCTL_CARD", conflicts_with = "device")]
    card: Option<u32>,

    /// ALSA device string (e.g. hw:CARD=PCH)
    #[arg(short = 'D', long, env = "SOUNDCTL_DEVICE")]
    device: Option<String>,
}

impl ScopeArgs {
    fn selector(&self) -> CardSelector {
        match (&self.device, self.card) {
            (Some(device), _) => CardSelector::Device(device.clone()),
            (None, Some(index)) => CardSelector::CardIndex(index),
            (None, None) => CardSelector::Default,
        }
    }
}

/// A mixer element and its scope.
#[derive(Args, Debug, Clone)]
struct ElementArgs {
    /// Element name (e.g. Master)
    name: String,

    /// Element index, for elements sharing a name
    #[arg(long, default_value_t = 0)]
    index: u32,

    #[command(flatten)]
    scope: ScopeArgs,
}

impl ElementArgs {
    fn id(&self) -> MixerElementId {
        MixerElementId::new(self.name.clone(), self.index)
    }
}

fn channel_selector(channel: Option<u32>) -> ChannelSelector {
    channel.map_or(ChannelSelector::All, ChannelSelector::Channel)
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sound cards
    Cards {
        #[arg(long)]
        json: bool,
    },

    /// List simple mixer elements
    Mixers {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List PCM devices
    Pcms {
        /// Only list devices for this direction
        #[arg(long)]
        direction: Option<StreamType>,
    },

    /// Show a mixer element
    Mixer {
        #[command(flatten)]
        element: ElementArgs,
    },

    /// Set the volume of a mixer element, in percent
    SetVolume {
        #[command(flatten)]
        element: ElementArgs,

        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,

        /// Only change this channel
        #[arg(long)]
        channel: Option<u32>,

        #[arg(long, default_value = "playback")]
        direction: StreamType,
    },

    /// Mute or unmute a mixer element
    SetMute {
        #[command(flatten)]
        element: ElementArgs,

        #[arg(value_enum)]
        state: Switch,

        #[arg(long)]
        channel: Option<u32>,
    },

    /// Enable or disable a mixer element as a record source
    SetRec {
        #[command(flatten)]
        element: ElementArgs,

        #[arg(value_enum)]
        state: Switch,

        #[arg(long)]
        channel: Option<u32>,
    },

    /// Open a PCM stream and show the parameters the driver accepts
    StreamInfo {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long, default_value = "playback")]
        direction: StreamType,

        /// Open in non-blocking mode
        #[arg(long)]
        nonblock: bool,

        #[arg(long)]
        channels: Option<u32>,

        #[arg(long)]
        rate: Option<u32>,

        #[arg(long)]
        format: Option<SampleFormat>,

        /// Period size in frames
        #[arg(long)]
        period_size: Option<u64>,
    },

    /// Check the handle lifecycle against every device
    Selftest {
        #[arg(long)]
        json: bool,
    },

    /// Open every mixer element and PCM device and report what they answer
    Inspect {
        #[arg(long)]
        json: bool,

        /// Skip PCM devices
        #[arg(long)]
        no_streams: bool,

        /// Skip capture PCM devices
        #[arg(long)]
        playback_only: bool,
    },
}

/// Initialize logging.
fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn open_backend(kind: BackendKind) -> anyhow::Result<Arc<dyn SoundBackend>> {
    match kind {
        BackendKind::Alsa => create_backend().context("native backend unavailable (try --backend mock)"),
        BackendKind::Mock => Ok(Arc::new(MockBackend::demo())),
    }
}

/// Parse the command line and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(cli, &mut io::stdout().lock())
}

fn execute(cli: Cli, out: &mut dyn io::Write) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let backend = open_backend(cli.backend)?;
    info!(backend = backend.name(), "soundctl starting");
    debug!(command = ?cli.command, "Dispatching");

    match cli.command {
        Command::Cards { json } => commands::cards(backend.as_ref(), json, out),
        Command::Mixers { scope } => commands::mixers(backend.as_ref(), &scope.selector(), out),
        Command::Pcms { direction } => commands::pcms(backend.as_ref(), direction, out),
        Command::Mixer { element } => {
            commands::show_mixer(backend.as_ref(), &element.id(), &element.scope.selector(), out)
        }
        Command::SetVolume {
            element,
            percent,
            channel,
            direction,
        } => commands::set_volume(
            backend.as_ref(),
            &element.id(),
            &element.scope.selector(),
            percent,
            channel_selector(channel),
            direction,
        ),
        Command::SetMute {
            element,
            state,
            channel,
        } => commands::set_mute(
            backend.as_ref(),
            &element.id(),
            &element.scope.selector(),
            state.is_on(),
            channel_selector(channel),
        ),
        Command::SetRec {
            element,
            state,
            channel,
        } => commands::set_record(
            backend.as_ref(),
            &element.id(),
            &element.scope.selector(),
            state.is_on(),
            channel_selector(channel),
        ),
        Command::StreamInfo {
            scope,
            direction,
            nonblock,
            channels,
            rate,
            format,
            period_size,
        } => {
            let mut params = config.stream;
            params.channels = channels.unwrap_or(params.channels);
            params.rate = rate.unwrap_or(params.rate);
            params.format = format.unwrap_or(params.format);
            params.period_size = period_size.unwrap_or(params.period_size);
            let mode = if nonblock {
                StreamMode::NonBlock
            } else {
                StreamMode::Normal
            };
            commands::stream_info(backend.as_ref(), direction, mode, &scope.selector(), params, out)
        }
        Command::Selftest { json } => commands::selftest(backend, json, out),
        Command::Inspect {
            json,
            no_streams,
            playback_only,
        } => {
            let mut options = config.inspect_options();
            options.open_streams &= !no_streams;
            options.include_capture &= !playback_only;
            commands::inspect(backend, options, json, out)
        }
    }
}
