//! Log records forwarded to the collector.
//!
//! Records are buffered on the client and flushed in batches through the
//! exporter, behind the circuit breaker. While the collector is unreachable
//! they are delivered to the local `tracing` subscriber instead, so nothing
//! is silently lost.

use crate::span::SpanContext;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Log record for forwarding to the collector.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Service identifier
    pub service_id: String,
    /// Trace identifier of the active span, if any
    pub trace_id: Option<String>,
    /// Span identifier of the active span, if any
    pub span_id: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Create a new log record.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            service_id: service_id.into(),
            trace_id: None,
            span_id: None,
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach the trace context of the active span.
    #[must_use]
    pub fn with_span_context(mut self, ctx: &SpanContext) -> Self {
        self.trace_id = Some(ctx.trace_id.clone());
        self.span_id = Some(ctx.span_id.clone());
        self
    }

    /// Add metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Deliver this record to the local `tracing` subscriber.
    ///
    /// Fallback path used while the collector is unreachable.
    pub fn log_locally(&self) {
        let trace = self.trace_id.as_deref().unwrap_or("-");
        match self.level {
            LogLevel::Debug => debug!(
                trace_id = trace,
                service = %self.service_id,
                "{}",
                self.message
            ),
            LogLevel::Info => info!(
                trace_id = trace,
                service = %self.service_id,
                "{}",
                self.message
            ),
            LogLevel::Warn => warn!(
                trace_id = trace,
                service = %self.service_id,
                "{}",
                self.message
            ),
            LogLevel::Error => error!(
                trace_id = trace,
                service = %self.service_id,
                "{}",
                self.message
            ),
        }
    }
}
