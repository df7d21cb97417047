//! In-process telemetry core for svc-platform Rust services.
//!
//! This crate provides centralized implementations for:
//! - Trace span lifecycle with scope-guaranteed ending and explicit context
//!   propagation
//! - Counter and histogram metric recording
//! - Buffered log forwarding to the collector with local fallback
//! - Circuit breaker protection for the export path
//! - Composable instrumentation wrappers (tracing, error capture, timing)
//! - Telemetry health reporting for the health endpoint
//!
//! Wire encoding and transport live behind the [`exporter::TelemetryExporter`]
//! trait; this crate only observes whether a batch was delivered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
mod buffer;
pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod error;
pub mod exporter;
pub mod health;
pub mod instrument;
pub mod logs;
pub mod metrics;
pub mod span;

pub use attributes::{attrs, AttrValue, Attributes};
pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::TelemetryClient;
pub use config::{init_tracing, TelemetryConfig, TracingConfig};
pub use error::TelemetryError;
pub use exporter::{NoopExporter, TelemetryExporter};
pub use health::{HealthMonitor, HealthReport, HealthStatus};
pub use instrument::{measured, traced, track_errors};
pub use logs::{LogLevel, LogRecord};
pub use metrics::{Counter, ExportMetrics, InstrumentKind, MetricPoint, MetricsRecorder};
pub use span::{ScopedSpan, SpanContext, SpanData, SpanEvent, SpanKind, SpanStatus};
