//! Trace span lifecycle: data model, explicit context propagation, and the
//! scope guard that guarantees every started span ends exactly once.
//!
//! Spans are per-call objects owned by the call that created them. There is no
//! ambient "current span"; nesting is done by passing a [`SpanContext`] to the
//! child explicitly, which keeps traces intact across concurrency boundaries.

use crate::attributes::{AttrValue, Attributes};
use crate::buffer::BoundedQueue;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Span kind, mirroring the collector's span taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Internal operation
    Internal,
    /// Server side of a remote call
    Server,
    /// Client side of a remote call
    Client,
    /// Message producer
    Producer,
    /// Message consumer
    Consumer,
}

/// Span status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    /// No status recorded
    Unset,
    /// Completed successfully
    Ok,
    /// Completed with an error
    Error,
}

/// A timestamped event attached to a span.
#[derive(Debug, Clone)]
pub struct SpanEvent {
    /// Event name
    pub name: String,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Event attributes
    pub attributes: Attributes,
}

/// Identifier handle for explicit parent/child propagation.
///
/// Children hold the parent's identifiers only, never a back-pointer to the
/// parent span itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    /// Trace identifier, 32 lowercase hex characters
    pub trace_id: String,
    /// Span identifier, 16 lowercase hex characters
    pub span_id: String,
    /// Whether this trace is being recorded
    pub sampled: bool,
}

impl SpanContext {
    /// Format as a W3C `traceparent` header value.
    #[must_use]
    pub fn traceparent(&self) -> String {
        let flags = if self.sampled { "01" } else { "00" };
        format!("00-{}-{}-{}", self.trace_id, self.span_id, flags)
    }

    /// Parse a W3C `traceparent` header value.
    ///
    /// Format: version-trace_id-parent_id-flags (00-{32hex}-{16hex}-{2hex}).
    /// Returns `None` when the header is malformed.
    #[must_use]
    pub fn parse_traceparent(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.split('-').collect();
        if parts.len() != 4 {
            return None;
        }
        let valid = parts[0].len() == 2
            && parts[1].len() == 32
            && parts[2].len() == 16
            && parts[3].len() == 2
            && parts
                .iter()
                .all(|p| p.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return None;
        }
        let sampled = u8::from_str_radix(parts[3], 16)
            .map(|f| f & 0x01 != 0)
            .unwrap_or(false);
        Some(Self {
            trace_id: parts[1].to_ascii_lowercase(),
            span_id: parts[2].to_ascii_lowercase(),
            sampled,
        })
    }
}

/// A finished or in-flight span as handed to the exporter.
#[derive(Debug, Clone)]
pub struct SpanData {
    /// Span name
    pub name: String,
    /// Trace identifier
    pub trace_id: String,
    /// Span identifier
    pub span_id: String,
    /// Parent span identifier, `None` for a root span
    pub parent_id: Option<String>,
    /// Span kind
    pub kind: SpanKind,
    /// Span attributes
    pub attributes: Attributes,
    /// Span status
    pub status: SpanStatus,
    /// Error description when status is [`SpanStatus::Error`]
    pub status_description: Option<String>,
    /// Ordered list of events recorded before the span ended
    pub events: Vec<SpanEvent>,
    /// Start timestamp
    pub started_at: DateTime<Utc>,
    /// End timestamp, set exactly once when the span ends
    pub ended_at: Option<DateTime<Utc>>,
}

impl SpanData {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: SpanKind,
        trace_id: String,
        parent_id: Option<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            name: name.into(),
            trace_id,
            span_id: new_span_id(),
            parent_id,
            kind,
            attributes,
            status: SpanStatus::Unset,
            status_description: None,
            events: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

/// Generate a new 32-hex-character trace identifier.
pub(crate) fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate a new 16-hex-character span identifier.
pub(crate) fn new_span_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..16].to_string()
}

/// Destination for ended spans, shared by all guards of one client.
#[derive(Debug)]
pub(crate) struct SpanSink {
    pub(crate) queue: BoundedQueue<SpanData>,
    open: AtomicU64,
}

impl SpanSink {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: BoundedQueue::new(capacity),
            open: AtomicU64::new(0),
        }
    }

    fn span_opened(&self) {
        self.open.fetch_add(1, Ordering::Relaxed);
    }

    fn span_closed(&self) {
        self.open.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn open_count(&self) -> u64 {
        self.open.load(Ordering::Relaxed)
    }
}

/// Scope guard owning one span.
///
/// The span ends exactly once on every exit path: calling [`end`](Self::end)
/// is the normal completion; dropping the guard without ending it (an early
/// return the wrapper did not see, or a cancelled task) still enqueues the
/// span, marked with a cancelled error status if no status was recorded.
///
/// When the circuit breaker has telemetry disabled the guard is non-recording:
/// the same type with the same API, so calling code never branches on
/// telemetry health. All mutations become no-ops and nothing is enqueued.
#[derive(Debug)]
pub struct ScopedSpan {
    data: Option<SpanData>,
    sink: Option<Arc<SpanSink>>,
}

impl ScopedSpan {
    pub(crate) fn recording(data: SpanData, sink: Arc<SpanSink>) -> Self {
        sink.span_opened();
        Self {
            data: Some(data),
            sink: Some(sink),
        }
    }

    pub(crate) fn non_recording(data: SpanData) -> Self {
        Self {
            data: Some(data),
            sink: None,
        }
    }

    /// Whether this span will be exported when it ends.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.sink.is_some() && self.data.is_some()
    }

    /// Identifier handle for creating child spans.
    ///
    /// Non-recording spans still carry valid identifiers so that nesting code
    /// paths work unchanged while telemetry is degraded.
    #[must_use]
    pub fn context(&self) -> SpanContext {
        self.data.as_ref().map_or_else(
            || SpanContext {
                trace_id: new_trace_id(),
                span_id: new_span_id(),
                sampled: false,
            },
            |data| SpanContext {
                trace_id: data.trace_id.clone(),
                span_id: data.span_id.clone(),
                sampled: self.sink.is_some(),
            },
        )
    }

    /// Span name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.data.as_ref().map_or("", |data| data.name.as_str())
    }

    /// Set an attribute on the span.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        if self.sink.is_none() {
            return;
        }
        if let Some(data) = self.data.as_mut() {
            data.attributes.insert(key.into(), value.into());
        }
    }

    /// Record a timestamped event on the span.
    pub fn add_event(&mut self, name: impl Into<String>, attributes: Attributes) {
        if self.sink.is_none() {
            return;
        }
        if let Some(data) = self.data.as_mut() {
            data.events.push(SpanEvent {
                name: name.into(),
                timestamp: Utc::now(),
                attributes,
            });
        }
    }

    /// Set the span status.
    pub fn set_status(&mut self, status: SpanStatus) {
        if self.sink.is_none() {
            return;
        }
        if let Some(data) = self.data.as_mut() {
            data.status = status;
        }
    }

    /// Record an error into the span: error status, description, and an
    /// exception event.
    pub fn record_error(&mut self, error: &dyn Display) {
        if self.sink.is_none() {
            return;
        }
        let message = error.to_string();
        if let Some(data) = self.data.as_mut() {
            data.status = SpanStatus::Error;
            data.status_description = Some(message.clone());
            data.events.push(SpanEvent {
                name: "exception".to_string(),
                timestamp: Utc::now(),
                attributes: crate::attributes::attrs([(
                    "exception.message",
                    AttrValue::Str(message),
                )]),
            });
        }
    }

    /// End the span, enqueueing it for export.
    ///
    /// Consumes the guard, so a span cannot be ended twice or mutated after
    /// ending.
    pub fn end(mut self) {
        self.finish(false);
    }

    fn finish(&mut self, cancelled: bool) {
        let Some(mut data) = self.data.take() else {
            return;
        };
        data.ended_at = Some(Utc::now());
        if cancelled && data.status == SpanStatus::Unset {
            data.status = SpanStatus::Error;
            data.status_description = Some("operation cancelled".to_string());
        }
        if let Some(sink) = &self.sink {
            sink.span_closed();
            sink.queue.push(data, "spans");
        }
    }
}

impl Drop for ScopedSpan {
    fn drop(&mut self) {
        self.finish(true);
    }
}
