//! Metric instruments and recording.
//!
//! Instruments are process-wide: a name is registered once with a kind and
//! reused for every recording. Recording appends a point to a bounded buffer;
//! there is no identity beyond (instrument, attributes, value, timestamp).

use crate::attributes::Attributes;
use crate::buffer::BoundedQueue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::error;

/// Metric instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    /// Monotonic counter
    Counter,
    /// Value distribution
    Histogram,
}

impl InstrumentKind {
    /// String form used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Histogram => "histogram",
        }
    }
}

/// A single recorded metric value.
#[derive(Debug, Clone)]
pub struct MetricPoint {
    /// Instrument name
    pub name: String,
    /// Instrument kind
    pub kind: InstrumentKind,
    /// Recorded value
    pub value: f64,
    /// Attributes attached at record time
    pub attributes: Attributes,
    /// Record timestamp
    pub timestamp: DateTime<Utc>,
}

/// Append-only metric recorder with a process-wide instrument registry.
///
/// Recording never fails and never blocks beyond a short lock: a kind
/// conflict (the same name recorded as both counter and histogram) is a
/// programming defect, logged loudly and dropped rather than surfaced to the
/// caller's business flow.
#[derive(Debug)]
pub struct MetricsRecorder {
    instruments: RwLock<HashMap<String, InstrumentKind>>,
    pub(crate) pending: BoundedQueue<MetricPoint>,
}

impl MetricsRecorder {
    /// Create a recorder with the given buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            instruments: RwLock::new(HashMap::new()),
            pending: BoundedQueue::new(capacity),
        }
    }

    /// Append a counter increment.
    pub fn record_counter(&self, name: &str, value: u64, attributes: Attributes) {
        // u64 -> f64 is lossy above 2^53; counter increments are far below.
        #[allow(clippy::cast_precision_loss)]
        self.record(name, InstrumentKind::Counter, value as f64, attributes);
    }

    /// Append a histogram observation.
    pub fn record_histogram(&self, name: &str, value: f64, attributes: Attributes) {
        self.record(name, InstrumentKind::Histogram, value, attributes);
    }

    fn record(&self, name: &str, kind: InstrumentKind, value: f64, attributes: Attributes) {
        if !self.register(name, kind) {
            return;
        }
        self.pending.push(
            MetricPoint {
                name: name.to_string(),
                kind,
                value,
                attributes,
                timestamp: Utc::now(),
            },
            "metrics",
        );
    }

    /// Register an instrument, returning `false` on a kind conflict.
    fn register(&self, name: &str, kind: InstrumentKind) -> bool {
        let Ok(mut instruments) = self.instruments.write() else {
            return false;
        };
        match instruments.get(name) {
            Some(existing) if *existing != kind => {
                error!(
                    instrument = name,
                    registered = existing.as_str(),
                    requested = kind.as_str(),
                    "metric instrument kind conflict, recording dropped"
                );
                false
            }
            Some(_) => true,
            None => {
                instruments.insert(name.to_string(), kind);
                true
            }
        }
    }

    /// Number of points waiting for export.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of points dropped to buffer overflow.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.pending.dropped_count()
    }
}

/// A monotonically increasing local counter.
///
/// Used for the client's own health accounting, which must stay readable even
/// while the export path is down.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
            self.name,
            self.help,
            self.name,
            self.name,
            self.get()
        )
    }
}

/// Export-path accounting kept locally, outside the exporter.
#[derive(Debug)]
pub struct ExportMetrics {
    /// Export batches attempted
    pub attempts: Counter,
    /// Export batches that failed or timed out
    pub failures: Counter,
}

impl ExportMetrics {
    /// Create export metrics with the given prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            attempts: Counter::new(
                format!("{prefix}_export_attempts_total"),
                "Total number of export batches attempted",
            ),
            failures: Counter::new(
                format!("{prefix}_export_failures_total"),
                "Total number of export batches that failed",
            ),
        }
    }

    /// Record an export attempt outcome.
    pub fn record_attempt(&self, success: bool) {
        self.attempts.inc();
        if !success {
            self.failures.inc();
        }
    }

    /// Format all counters as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "{}{}",
            self.attempts.to_prometheus(),
            self.failures.to_prometheus()
        )
    }
}
