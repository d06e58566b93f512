//! Counters collected while inspecting a host.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Totals for one inspection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub scopes: u64,
    pub mixers_opened: u64,
    pub mixers_failed: u64,
    pub streams_opened: u64,
    pub streams_failed: u64,
    pub op_errors: u64,
    pub elapsed_ms: u64,
}

impl ReportStats {
    /// Handles that could not be opened plus operations that failed.
    pub fn failures(&self) -> u64 {
        self.mixers_failed + self.streams_failed + self.op_errors
    }
}

/// Collects [`ReportStats`] as the inspector walks the host.
pub(crate) struct StatsCollector {
    start_time: RwLock<Option<Instant>>,
    scopes: AtomicU64,
    mixers_opened: AtomicU64,
    mixers_failed: AtomicU64,
    streams_opened: AtomicU64,
    streams_failed: AtomicU64,
    op_errors: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            start_time: RwLock::new(None),
            scopes: AtomicU64::new(0),
            mixers_opened: AtomicU64::new(0),
            mixers_failed: AtomicU64::new(0),
            streams_opened: AtomicU64::new(0),
            streams_failed: AtomicU64::new(0),
            op_errors: AtomicU64::new(0),
        }
    }

    pub fn start(&self) {
        *self.start_time.write() = Some(Instant::now());
    }

    pub fn record_scope(&self) {
        self.scopes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mixer(&self, opened: bool) {
        let counter = if opened {
            &self.mixers_opened
        } else {
            &self.mixers_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream(&self, opened: bool) {
        let counter = if opened {
            &self.streams_opened
        } else {
            &self.streams_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_op_error(&self) {
        self.op_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReportStats {
        let elapsed_ms = self
            .start_time
            .read()
            .map(|s| u64::try_from(s.elapsed().as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        ReportStats {
            scopes: self.scopes.load(Ordering::Relaxed),
            mixers_opened: self.mixers_opened.load(Ordering::Relaxed),
            mixers_failed: self.mixers_failed.load(Ordering::Relaxed),
            streams_opened: self.streams_opened.load(Ordering::Relaxed),
            streams_failed: self.streams_failed.load(Ordering::Relaxed),
            op_errors: self.op_errors.load(Ordering::Relaxed),
            elapsed_ms,
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
