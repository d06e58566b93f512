//! Walks a host and records what every mixer element and PCM device reports.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use soundctl_audio::{
    list_cards, list_mixer_ids, list_stream_devices, run_mixer_ops, run_stream_ops,
    MixerHandle, SoundBackend, StreamHandle,
};
use soundctl_types::{
    CardInfo, CardSelector, MixerElementId, MixerOp, StreamMode, StreamOp, StreamParams,
    StreamType,
};

use crate::report::{
    InspectionReport, MixerReport, OpRecord, RecordedError, ScopeError, StreamReport,
};
use crate::stats::StatsCollector;
use crate::InspectResult;

/// What the inspector visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectOptions {
    /// Open PCM devices as well as mixer elements.
    pub open_streams: bool,

    /// Visit capture PCMs, not only playback.
    pub include_capture: bool,

    /// Parameters applied when opening PCM devices.
    pub stream_params: StreamParams,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            open_streams: true,
            include_capture: true,
            stream_params: StreamParams::default(),
        }
    }
}

/// Steps of an inspection run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Cards,
    Mixers,
    Streams,
}

impl Phase {
    fn next(self) -> Option<Self> {
        match self {
            Self::Cards => Some(Self::Mixers),
            Self::Mixers => Some(Self::Streams),
            Self::Streams => None,
        }
    }
}

/// Capability inspector.
///
/// Only card enumeration failures abort a run; anything that goes wrong with
/// an individual scope, element or device is recorded in the report.
pub struct Inspector {
    backend: Arc<dyn SoundBackend>,
    options: InspectOptions,
    stats: StatsCollector,
}

impl Inspector {
    pub fn new(backend: Arc<dyn SoundBackend>, options: InspectOptions) -> Self {
        Self {
            backend,
            options,
            stats: StatsCollector::new(),
        }
    }

    /// Visit the whole host.
    #[instrument(name = "inspect", skip(self), fields(backend = self.backend.name()))]
    pub fn run(&self) -> InspectResult<InspectionReport> {
        self.stats.start();
        info!("Inspection starting");

        let mut report = InspectionReport {
            backend: self.backend.name().to_string(),
            cards: Vec::new(),
            mixers: Vec::new(),
            streams: Vec::new(),
            scope_errors: Vec::new(),
            stats: Default::default(),
        };

        let mut phase = Phase::Cards;
        loop {
            debug!(?phase, "Inspection phase");
            match phase {
                Phase::Cards => report.cards = list_cards(self.backend.as_ref())?,
                Phase::Mixers => self.inspect_mixers(&mut report),
                Phase::Streams => {
                    if self.options.open_streams {
                        self.inspect_streams(&mut report);
                    }
                }
            }

            match phase.next() {
                Some(next) => phase = next,
                None => break,
            }
        }

        report.stats = self.stats.snapshot();
        info!(
            mixers = report.mixers.len(),
            streams = report.streams.len(),
            failures = report.stats.failures(),
            "Inspection finished"
        );
        Ok(report)
    }

    fn inspect_mixers(&self, report: &mut InspectionReport) {
        let mut scopes = vec![CardSelector::Default];
        scopes.extend(report.cards.iter().map(CardInfo::selector));

        for scope in scopes {
            self.stats.record_scope();
            match list_mixer_ids(self.backend.as_ref(), &scope) {
                Ok(ids) => {
                    for id in ids {
                        report.mixers.push(self.inspect_mixer(&scope, id));
                    }
                }
                Err(e) => {
                    warn!(%scope, error = %e, "Unable to list mixers");
                    report.scope_errors.push(ScopeError {
                        scope: scope.to_string(),
                        error: RecordedError::from(&e),
                    });
                }
            }
        }
    }

    fn inspect_mixer(&self, scope: &CardSelector, element: MixerElementId) -> MixerReport {
        let mut mixer_report = MixerReport {
            scope: scope.to_string(),
            element,
            open_error: None,
            operations: Vec::new(),
        };

        let mut mixer =
            match MixerHandle::open_element(self.backend.as_ref(), &mixer_report.element, scope) {
                Ok(mixer) => mixer,
                Err(e) => {
                    debug!(%scope, element = %mixer_report.element, error = %e, "Mixer open failed");
                    self.stats.record_mixer(false);
                    mixer_report.open_error = Some(RecordedError::from(&e));
                    return mixer_report;
                }
            };
        self.stats.record_mixer(true);

        let readers = MixerOp::readers();
        for (op, result) in run_mixer_ops(&mut mixer, &readers) {
            let record = OpRecord::new(op.name(), result);
            if !record.is_ok() {
                self.stats.record_op_error();
            }
            mixer_report.operations.push(record);
        }

        if let Err(e) = mixer.close() {
            warn!(element = %mixer_report.element, error = %e, "Mixer close failed");
            self.stats.record_op_error();
            mixer_report
                .operations
                .push(OpRecord::new("close", Err(e)));
        }
        mixer_report
    }

    fn inspect_streams(&self, report: &mut InspectionReport) {
        let directions: &[StreamType] = if self.options.include_capture {
            &StreamType::ALL
        } else {
            &[StreamType::Playback]
        };

        for &direction in directions {
            let devices = match list_stream_devices(self.backend.as_ref(), direction) {
                Ok(devices) => devices,
                Err(e) => {
                    warn!(%direction, error = %e, "Unable to list PCM devices");
                    report.scope_errors.push(ScopeError {
                        scope: direction.to_string(),
                        error: RecordedError::from(&e),
                    });
                    continue;
                }
            };
            for device in devices {
                report.streams.push(self.inspect_stream(direction, device));
            }
        }
    }

    fn inspect_stream(&self, direction: StreamType, device: String) -> StreamReport {
        let mut stream_report = StreamReport {
            device,
            direction,
            open_error: None,
            params: None,
            operations: Vec::new(),
        };

        let scope = CardSelector::Device(stream_report.device.clone());
        let opened = StreamHandle::open_with(
            self.backend.as_ref(),
            direction,
            StreamMode::Normal,
            &scope,
            self.options.stream_params,
        );
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                debug!(device = %stream_report.device, error = %e, "PCM open failed");
                self.stats.record_stream(false);
                stream_report.open_error = Some(RecordedError::from(&e));
                return stream_report;
            }
        };
        self.stats.record_stream(true);
        stream_report.params = stream.params().ok();

        let readers = StreamOp::readers();
        for (op, result) in run_stream_ops(&mut stream, &readers) {
            let record = OpRecord::new(op.name(), result);
            if !record.is_ok() {
                self.stats.record_op_error();
            }
            stream_report.operations.push(record);
        }

        if let Err(e) = stream.close() {
            warn!(device = %stream_report.device, error = %e, "PCM close failed");
            self.stats.record_op_error();
            stream_report.operations.push(OpRecord::new("close", Err(e)));
        }
        stream_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundctl_audio::MockBackend;

    #[test]
    fn test_demo_host_is_clean() {
        let backend = MockBackend::demo();
        let report = Inspector::new(Arc::new(backend.clone()), InspectOptions::default())
            .run()
            .unwrap();

        assert_eq!(report.backend, "mock");
        assert_eq!(report.cards.len(), 2);
        // default scope repeats card 0's six elements
        assert_eq!(report.mixers.len(), 6 + 6 + 2);
        assert!(report.mixers.iter().all(|m| m.operations.len() == 8));
        assert_eq!(report.stats.scopes, 3);
        assert!(report.is_clean(), "{:?}", report.stats);
        assert_eq!(backend.held(), 0);
    }

    #[test]
    fn test_open_failures_are_recorded() {
        let backend = MockBackend::demo();
        let options = InspectOptions {
            stream_params: StreamParams::calibration(),
            ..InspectOptions::default()
        };
        let report = Inspector::new(Arc::new(backend), options).run().unwrap();

        let failed: Vec<_> = report
            .streams
            .iter()
            .filter(|s| s.open_error.is_some())
            .collect();
        // hw devices reject 8-bit samples in both directions
        assert_eq!(failed.len(), 4);
        assert!(failed
            .iter()
            .all(|s| s.open_error.as_ref().unwrap().kind == "UnsupportedParameter"));
        assert_eq!(report.stats.streams_failed, 4);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_playback_only_without_streams() {
        let options = InspectOptions {
            open_streams: false,
            ..InspectOptions::default()
        };
        let report = Inspector::new(Arc::new(MockBackend::demo()), options)
            .run()
            .unwrap();
        assert!(report.streams.is_empty());

        let options = InspectOptions {
            include_capture: false,
            ..InspectOptions::default()
        };
        let report = Inspector::new(Arc::new(MockBackend::demo()), options)
            .run()
            .unwrap();
        assert!(report
            .streams
            .iter()
            .all(|s| s.direction == StreamType::Playback));
    }

    #[test]
    fn test_empty_host() {
        let report = Inspector::new(Arc::new(MockBackend::new()), InspectOptions::default())
            .run()
            .unwrap();
        assert!(report.cards.is_empty());
        assert!(report.mixers.is_empty());
        assert!(report.streams.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_report_serialises() {
        let report = Inspector::new(Arc::new(MockBackend::demo()), InspectOptions::default())
            .run()
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cards"][0]["id"], "PCH");
        assert_eq!(json["mixers"][0]["operations"][0]["op"], "cardname");
        assert!(json.get("scope_errors").is_none());
    }
}
