//! Command handlers.
//!
//! Each handler writes its output to `out` so that tests can capture it.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{debug, instrument};

use soundctl_audio::{
    list_cards, list_mixer_ids, list_stream_devices, MixerHandle, SoundBackend, StreamHandle,
};
use soundctl_inspect::{CheckStatus, InspectOptions, Inspector, SelfTest};
use soundctl_types::{
    CardSelector, ChannelSelector, MixerElementId, StreamMode, StreamParams, StreamType,
};

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn on_off(states: &[bool]) -> String {
    states
        .iter()
        .map(|&on| if on { "on" } else { "off" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// List sound cards.
pub fn cards(backend: &dyn SoundBackend, json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let cards = list_cards(backend)?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &cards)?;
        writeln!(out)?;
        return Ok(());
    }
    if cards.is_empty() {
        writeln!(out, "no sound cards found")?;
    }
    for card in cards {
        writeln!(out, "{:>2} [{:<15}] {}", card.index, card.id, card.long_name)?;
    }
    Ok(())
}

/// List mixer elements in `scope`.
pub fn mixers(
    backend: &dyn SoundBackend,
    scope: &CardSelector,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    for id in list_mixer_ids(backend, scope).with_context(|| format!("list mixers in {scope}"))? {
        writeln!(out, "Simple mixer control {id}")?;
    }
    Ok(())
}

/// List PCM device names.
pub fn pcms(
    backend: &dyn SoundBackend,
    direction: Option<StreamType>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let directions = match direction {
        Some(direction) => vec![direction],
        None => StreamType::ALL.to_vec(),
    };
    for direction in directions {
        writeln!(out, "{direction}:")?;
        for device in list_stream_devices(backend, direction)? {
            writeln!(out, "  {device}")?;
        }
    }
    Ok(())
}

/// Print everything a mixer element reports.
#[instrument(skip(backend, out))]
pub fn show_mixer(
    backend: &dyn SoundBackend,
    element: &MixerElementId,
    scope: &CardSelector,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut mixer = MixerHandle::open_element(backend, element, scope)
        .with_context(|| format!("open mixer {element} in {scope}"))?;

    writeln!(out, "Simple mixer control {element} on {}", mixer.card_name()?)?;
    writeln!(out, "  Switch capabilities: {}", join(&mixer.switch_capabilities()?))?;
    writeln!(out, "  Volume capabilities: {}", join(&mixer.volume_capabilities()?))?;

    for direction in StreamType::ALL {
        let volumes = mixer.get_volume(direction)?;
        if volumes.is_empty() {
            continue;
        }
        let range = mixer.get_range(direction)?;
        let percents = volumes
            .iter()
            .map(|v| format!("{v}%"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            out,
            "  {direction}: {percents} [range {}..{}]",
            range.min, range.max
        )?;
    }

    // Elements without the matching switch answer UnsupportedParameter.
    if let Ok(muted) = mixer.get_mute() {
        writeln!(out, "  Muted: {}", on_off(&muted))?;
    }
    if let Ok(record) = mixer.get_record() {
        writeln!(out, "  Record: {}", on_off(&record))?;
    }
    if let Some(value) = mixer.get_enumerated_value()? {
        writeln!(out, "  Item: '{}' of {}", value.current, join(&value.items))?;
    }

    mixer.close()?;
    Ok(())
}

/// Set the volume of a mixer element.
pub fn set_volume(
    backend: &dyn SoundBackend,
    element: &MixerElementId,
    scope: &CardSelector,
    percent: u8,
    channel: ChannelSelector,
    direction: StreamType,
) -> anyhow::Result<()> {
    let mut mixer = MixerHandle::open_element(backend, element, scope)
        .with_context(|| format!("open mixer {element} in {scope}"))?;
    mixer
        .set_volume(percent, channel, direction)
        .with_context(|| format!("set {direction} volume of {element}"))?;
    mixer.close()?;
    Ok(())
}

/// Mute or unmute a mixer element.
pub fn set_mute(
    backend: &dyn SoundBackend,
    element: &MixerElementId,
    scope: &CardSelector,
    mute: bool,
    channel: ChannelSelector,
) -> anyhow::Result<()> {
    let mut mixer = MixerHandle::open_element(backend, element, scope)
        .with_context(|| format!("open mixer {element} in {scope}"))?;
    mixer
        .set_mute(mute, channel)
        .with_context(|| format!("set mute of {element}"))?;
    mixer.close()?;
    Ok(())
}

/// Enable or disable a mixer element as a record source.
pub fn set_record(
    backend: &dyn SoundBackend,
    element: &MixerElementId,
    scope: &CardSelector,
    enabled: bool,
    channel: ChannelSelector,
) -> anyhow::Result<()> {
    let mut mixer = MixerHandle::open_element(backend, element, scope)
        .with_context(|| format!("open mixer {element} in {scope}"))?;
    mixer
        .set_record_source(enabled, channel)
        .with_context(|| format!("set record source of {element}"))?;
    mixer.close()?;
    Ok(())
}

/// Open a stream, apply `params` and print what the driver chose.
#[instrument(skip(backend, out))]
pub fn stream_info(
    backend: &dyn SoundBackend,
    direction: StreamType,
    mode: StreamMode,
    scope: &CardSelector,
    params: StreamParams,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut stream = StreamHandle::open_with(backend, direction, mode, scope, params)
        .with_context(|| format!("open {direction} stream on {}", scope.device_name()))?;
    let applied = stream.params()?;
    debug!(?applied, "Stream parameters");

    writeln!(out, "{direction} stream on {}", stream.device_name())?;
    writeln!(out, "  Card:        {}", stream.card_name()?)?;
    writeln!(out, "  Type:        {}", stream.stream_type()?.code())?;
    writeln!(out, "  Mode:        {}", stream.stream_mode()?.code())?;
    writeln!(out, "  Channels:    {}", applied.channels)?;
    writeln!(out, "  Rate:        {} Hz", applied.rate)?;
    writeln!(out, "  Format:      {}", applied.format)?;
    writeln!(out, "  Period size: {} frames", applied.period_size)?;
    if let Some(bytes) = applied.frame_bytes() {
        writeln!(out, "  Frame size:  {bytes} bytes")?;
    }

    stream.close()?;
    Ok(())
}

/// Run the lifecycle self-test. Fails if any check fails.
pub fn selftest(
    backend: Arc<dyn SoundBackend>,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let report = SelfTest::new(backend).run();

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        for check in &report.checks {
            let status = match check.status {
                CheckStatus::Passed => "PASS",
                CheckStatus::Failed => "FAIL",
                CheckStatus::Skipped => "SKIP",
            };
            writeln!(out, "{status} {:<26} {}", check.name, check.detail)?;
        }
    }

    if !report.success() {
        bail!(
            "self-test failed: {} of {} checks",
            report.count(CheckStatus::Failed),
            report.checks.len()
        );
    }
    Ok(())
}

/// Inspect every mixer element and PCM device.
pub fn inspect(
    backend: Arc<dyn SoundBackend>,
    options: InspectOptions,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let report = Inspector::new(backend, options).run()?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Backend: {}", report.backend)?;
    for card in &report.cards {
        writeln!(out, "Card {}: {} ({})", card.index, card.id, card.long_name)?;
    }
    for mixer in &report.mixers {
        match &mixer.open_error {
            Some(e) => writeln!(out, "  [{}] {}: {}", mixer.scope, mixer.element, e.message)?,
            None => {
                let failed = mixer.operations.iter().filter(|op| !op.is_ok()).count();
                writeln!(
                    out,
                    "  [{}] {}: {} ops, {failed} failed",
                    mixer.scope,
                    mixer.element,
                    mixer.operations.len()
                )?;
            }
        }
    }
    for stream in &report.streams {
        match (&stream.open_error, &stream.params) {
            (Some(e), _) => writeln!(out, "  {} {}: {}", stream.direction, stream.device, e.message)?,
            (None, Some(p)) => writeln!(
                out,
                "  {} {}: {} ch, {} Hz, {}",
                stream.direction, stream.device, p.channels, p.rate, p.format
            )?,
            (None, None) => writeln!(out, "  {} {}", stream.direction, stream.device)?,
        }
    }
    for error in &report.scope_errors {
        writeln!(out, "  {}: {}", error.scope, error.error.message)?;
    }

    let stats = report.stats;
    writeln!(
        out,
        "{} mixers ({} failed), {} streams ({} failed), {} operation errors in {} ms",
        stats.mixers_opened,
        stats.mixers_failed,
        stats.streams_opened,
        stats.streams_failed,
        stats.op_errors,
        stats.elapsed_ms
    )?;
    Ok(())
}
