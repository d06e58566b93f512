//! Lifecycle self-test against a live backend.
//!
//! Each check exercises one guarantee of the handle layer: enumeration never
//! fails for a listed card, listed devices open and close, and closed
//! handles reject every operation with `InvalidState`. Mutators are only ever
//! run on closed handles or with the calibration stream parameters, so the
//! self-test never changes a mixer setting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use soundctl_audio::{
    all_scopes, apply_mixer_op, apply_stream_op, list_mixer_ids, list_stream_devices,
    run_mixer_ops, run_stream_ops, AudioError, ErrorKind, MixerHandle, SoundBackend,
    StreamHandle,
};
use soundctl_types::{CardSelector, MixerElementId, MixerOp, StreamOp, StreamType};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// The host has nothing the check could run against.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfTestReport {
    pub backend: String,
    pub checks: Vec<CheckOutcome>,
}

impl SelfTestReport {
    /// Returns true if no check failed. Skipped checks do not count as
    /// failures.
    pub fn success(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Failed)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

enum Verdict {
    Pass(String),
    Skip(String),
}

type CheckResult = Result<Verdict, String>;

/// Runs the lifecycle checks.
pub struct SelfTest {
    backend: Arc<dyn SoundBackend>,
}

impl SelfTest {
    pub fn new(backend: Arc<dyn SoundBackend>) -> Self {
        Self { backend }
    }

    #[instrument(name = "selftest", skip(self), fields(backend = self.backend.name()))]
    pub fn run(&self) -> SelfTestReport {
        let checks: [(&str, fn(&dyn SoundBackend) -> CheckResult); 6] = [
            ("enumeration_totality", enumeration_totality),
            ("open_close", open_close),
            ("closed_handle_rejection", closed_handle_rejection),
            ("configuration_round_trip", configuration_round_trip),
            ("mixer_property_reads", mixer_property_reads),
            ("default_scope_scenario", default_scope_scenario),
        ];

        let outcomes = checks
            .iter()
            .map(|(name, check)| {
                let (status, detail) = match check(self.backend.as_ref()) {
                    Ok(Verdict::Pass(detail)) => (CheckStatus::Passed, detail),
                    Ok(Verdict::Skip(detail)) => (CheckStatus::Skipped, detail),
                    Err(detail) => (CheckStatus::Failed, detail),
                };
                match status {
                    CheckStatus::Failed => warn!(check = name, %detail, "Check failed"),
                    _ => debug!(check = name, ?status, %detail, "Check finished"),
                }
                CheckOutcome {
                    name: name.to_string(),
                    status,
                    detail,
                }
            })
            .collect();

        let report = SelfTestReport {
            backend: self.backend.name().to_string(),
            checks: outcomes,
        };
        info!(
            passed = report.count(CheckStatus::Passed),
            failed = report.count(CheckStatus::Failed),
            skipped = report.count(CheckStatus::Skipped),
            "Self-test finished"
        );
        report
    }
}

fn every_mixer(backend: &dyn SoundBackend) -> Result<Vec<(CardSelector, MixerElementId)>, String> {
    let mut mixers = Vec::new();
    for scope in all_scopes(backend).map_err(|e| format!("card enumeration: {e}"))? {
        let ids = list_mixer_ids(backend, &scope).map_err(|e| format!("mixers in {scope}: {e}"))?;
        mixers.extend(ids.into_iter().map(|id| (scope.clone(), id)));
    }
    Ok(mixers)
}

fn first_default_mixer(backend: &dyn SoundBackend) -> Result<Option<MixerElementId>, String> {
    let ids = list_mixer_ids(backend, &CardSelector::Default)
        .map_err(|e| format!("mixers in default scope: {e}"))?;
    Ok(ids.into_iter().next())
}

fn expect_invalid_state(what: &str, result: Result<impl Sized, AudioError>) -> Result<(), String> {
    match result {
        Err(e) if e.kind() == ErrorKind::InvalidState => Ok(()),
        Err(e) => Err(format!("{what} after close failed with {}: {e}", e.kind())),
        Ok(_) => Err(format!("{what} after close succeeded")),
    }
}

fn enumeration_totality(backend: &dyn SoundBackend) -> CheckResult {
    let scopes = all_scopes(backend).map_err(|e| format!("card enumeration: {e}"))?;
    for scope in &scopes {
        list_mixer_ids(backend, scope).map_err(|e| format!("mixers in {scope}: {e}"))?;
    }
    for direction in StreamType::ALL {
        list_stream_devices(backend, direction)
            .map_err(|e| format!("{direction} devices: {e}"))?;
    }
    Ok(Verdict::Pass(format!("{} scopes enumerated", scopes.len())))
}

/// PCM hints include devices that exist but cannot be opened with default
/// parameters or are held by another client; those are tolerated.
fn open_close(backend: &dyn SoundBackend) -> CheckResult {
    let mixers = every_mixer(backend)?;
    for (scope, id) in &mixers {
        let mut mixer = MixerHandle::open_element(backend, id, scope)
            .map_err(|e| format!("open mixer {id} in {scope}: {e}"))?;
        mixer
            .close()
            .map_err(|e| format!("close mixer {id} in {scope}: {e}"))?;
    }

    let mut streams = 0;
    let mut tolerated = 0;
    for direction in StreamType::ALL {
        let devices = list_stream_devices(backend, direction)
            .map_err(|e| format!("{direction} devices: {e}"))?;
        for device in devices {
            let scope = CardSelector::Device(device.clone());
            let mut stream = match StreamHandle::open(backend, direction, &scope) {
                Ok(stream) => stream,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::DeviceUnavailable | ErrorKind::UnsupportedParameter
                    ) =>
                {
                    debug!(%device, %direction, error = %e, "PCM not openable, skipping");
                    tolerated += 1;
                    continue;
                }
                Err(e) => return Err(format!("open {direction} PCM {device}: {e}")),
            };
            stream
                .close()
                .map_err(|e| format!("close {direction} PCM {device}: {e}"))?;
            streams += 1;
        }
    }

    if mixers.is_empty() && streams == 0 {
        return Ok(Verdict::Skip("no mixers or PCM devices to open".into()));
    }
    Ok(Verdict::Pass(format!(
        "{} mixers and {streams} PCM streams opened and closed ({tolerated} PCMs unavailable)",
        mixers.len()
    )))
}

fn closed_handle_rejection(backend: &dyn SoundBackend) -> CheckResult {
    let mut checked = Vec::new();

    if let Some((scope, id)) = every_mixer(backend)?.into_iter().next() {
        let mut mixer = MixerHandle::open_element(backend, &id, &scope)
            .map_err(|e| format!("open mixer {id}: {e}"))?;
        for (op, result) in run_mixer_ops(&mut mixer, &MixerOp::readers()) {
            result.map_err(|e| format!("{} on open mixer {id}: {e}", op.name()))?;
        }
        mixer.close().map_err(|e| format!("close mixer {id}: {e}"))?;
        for op in MixerOp::all() {
            expect_invalid_state(op.name(), apply_mixer_op(&mut mixer, &op))?;
        }
        expect_invalid_state("close", mixer.close())?;
        checked.push(format!("mixer {id}"));
    }

    match StreamHandle::open(backend, StreamType::Playback, &CardSelector::Default) {
        Ok(mut stream) => {
            for (op, result) in run_stream_ops(&mut stream, &StreamOp::readers()) {
                result.map_err(|e| format!("{} on open stream: {e}", op.name()))?;
            }
            stream.close().map_err(|e| format!("close stream: {e}"))?;
            for op in StreamOp::calibration() {
                expect_invalid_state(op.name(), apply_stream_op(&mut stream, &op))?;
            }
            expect_invalid_state("close", stream.close())?;
            checked.push("default playback stream".to_string());
        }
        Err(e) if e.kind() == ErrorKind::DeviceUnavailable => {
            debug!(error = %e, "No default playback stream");
        }
        Err(e) => return Err(format!("open default playback stream: {e}")),
    }

    if checked.is_empty() {
        return Ok(Verdict::Skip("no mixer or default stream to close".into()));
    }
    Ok(Verdict::Pass(format!("checked {}", checked.join(", "))))
}

fn configuration_round_trip(backend: &dyn SoundBackend) -> CheckResult {
    let mut stream = match StreamHandle::open(backend, StreamType::Playback, &CardSelector::Default)
    {
        Ok(stream) => stream,
        Err(e) if e.kind() == ErrorKind::DeviceUnavailable => {
            return Ok(Verdict::Skip(format!("no default playback stream: {e}")));
        }
        Err(e) => return Err(format!("open default playback stream: {e}")),
    };

    let calibration = StreamOp::calibration();
    for (op, result) in run_stream_ops(&mut stream, &calibration) {
        result.map_err(|e| format!("{} while open: {e}", op.name()))?;
    }
    let applied = stream.params().map_err(|e| e.to_string())?;
    stream.close().map_err(|e| format!("close: {e}"))?;

    for op in calibration.iter().filter(|op| op.is_mutator()) {
        expect_invalid_state(op.name(), apply_stream_op(&mut stream, op))?;
    }
    Ok(Verdict::Pass(format!(
        "{} ch, {} Hz, {}, period {}",
        applied.channels, applied.rate, applied.format, applied.period_size
    )))
}

fn mixer_property_reads(backend: &dyn SoundBackend) -> CheckResult {
    let Some(id) = first_default_mixer(backend)? else {
        return Ok(Verdict::Skip("no mixer in default scope".into()));
    };
    let mut mixer = MixerHandle::open_element(backend, &id, &CardSelector::Default)
        .map_err(|e| format!("open mixer {id}: {e}"))?;

    let readers = MixerOp::readers();
    for (op, result) in run_mixer_ops(&mut mixer, &readers) {
        result.map_err(|e| format!("{} while open: {e}", op.name()))?;
    }
    mixer.close().map_err(|e| format!("close: {e}"))?;
    for op in &readers {
        expect_invalid_state(op.name(), apply_mixer_op(&mut mixer, op))?;
    }
    Ok(Verdict::Pass(format!("{} readers on {id}", readers.len())))
}

fn default_scope_scenario(backend: &dyn SoundBackend) -> CheckResult {
    let cards = backend.list_cards().map_err(|e| format!("card enumeration: {e}"))?;
    if cards.is_empty() {
        return Ok(Verdict::Skip("no sound cards".into()));
    }
    let Some(id) = first_default_mixer(backend)? else {
        return Ok(Verdict::Skip("no mixer in default scope".into()));
    };

    let mut mixer = MixerHandle::open_element(backend, &id, &CardSelector::Default)
        .map_err(|e| format!("open mixer {id}: {e}"))?;
    let volume = mixer
        .get_volume(StreamType::Playback)
        .map_err(|e| format!("getvolume: {e}"))?;
    mixer.close().map_err(|e| format!("close: {e}"))?;
    expect_invalid_state("getvolume", mixer.get_volume(StreamType::Playback))?;

    Ok(Verdict::Pass(format!("{id} playback volume {volume:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundctl_audio::MockBackend;

    #[test]
    fn test_demo_host_passes() {
        let backend = MockBackend::demo();
        let report = SelfTest::new(Arc::new(backend.clone())).run();

        assert_eq!(report.checks.len(), 6);
        assert!(report.success());
        assert_eq!(report.count(CheckStatus::Passed), 6, "{report:#?}");
        assert_eq!(backend.held(), 0);
    }

    #[test]
    fn test_empty_host_skips() {
        let report = SelfTest::new(Arc::new(MockBackend::new())).run();
        assert!(report.success());

        let by_name = |name: &str| {
            report
                .checks
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.status)
                .unwrap()
        };
        assert_eq!(by_name("enumeration_totality"), CheckStatus::Passed);
        assert_eq!(by_name("open_close"), CheckStatus::Skipped);
        assert_eq!(by_name("configuration_round_trip"), CheckStatus::Skipped);
        assert_eq!(by_name("default_scope_scenario"), CheckStatus::Skipped);
    }

    #[test]
    fn test_busy_pcms_are_tolerated() {
        let backend = MockBackend::demo();
        let _held = StreamHandle::open(
            &backend,
            StreamType::Playback,
            &CardSelector::Device("hw:CARD=PCH,DEV=0".into()),
        )
        .unwrap();

        let report = SelfTest::new(Arc::new(backend.clone())).run();
        let open_close = &report.checks[1];
        assert!(open_close.passed());
        assert!(open_close.detail.contains("(1 PCMs unavailable)"));
    }

    #[test]
    fn test_busy_mixer_fails_open_close() {
        let backend = MockBackend::demo();
        let _mic = MixerHandle::open(&backend, "Mic", &CardSelector::CardIndex(1)).unwrap();

        let report = SelfTest::new(Arc::new(backend.clone())).run();
        assert!(!report.success());
        assert_eq!(report.checks[1].status, CheckStatus::Failed);
        assert!(report.checks[1].detail.contains("Mic"));
    }

    #[test]
    fn test_report_serialises() {
        let report = SelfTest::new(Arc::new(MockBackend::demo())).run();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["backend"], "mock");
        assert_eq!(json["checks"][0]["status"], "passed");
    }
}
