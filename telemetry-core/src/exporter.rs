//! Exporter boundary.
//!
//! The core treats "export a batch" as an opaque, possibly-failing operation
//! supplied by a collaborator. Wire encoding and transport live behind this
//! trait; the core only observes success or failure.

use crate::error::TelemetryError;
use crate::logs::LogRecord;
use crate::metrics::MetricPoint;
use crate::span::SpanData;
use async_trait::async_trait;

/// Destination for telemetry batches.
///
/// Implementations must be cheap to call and may fail; the client bounds each
/// call with a timeout and feeds the outcome into the circuit breaker, so an
/// implementation does not need its own retry or breaker logic.
#[async_trait]
pub trait TelemetryExporter: Send + Sync {
    /// Export a batch of ended spans.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch could not be delivered.
    async fn export_spans(&self, batch: &[SpanData]) -> Result<(), TelemetryError>;

    /// Export a batch of metric points.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch could not be delivered.
    async fn export_metrics(&self, batch: &[MetricPoint]) -> Result<(), TelemetryError>;

    /// Export a batch of log records.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch could not be delivered.
    async fn export_logs(&self, batch: &[LogRecord]) -> Result<(), TelemetryError>;

    /// Release exporter resources. Called once during client shutdown, after
    /// the final flush.
    ///
    /// # Errors
    ///
    /// Returns an error when resources could not be released cleanly.
    async fn shutdown(&self) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Exporter that discards everything, for tests and telemetry-disabled runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExporter;

#[async_trait]
impl TelemetryExporter for NoopExporter {
    async fn export_spans(&self, _batch: &[SpanData]) -> Result<(), TelemetryError> {
        Ok(())
    }

    async fn export_metrics(&self, _batch: &[MetricPoint]) -> Result<(), TelemetryError> {
        Ok(())
    }

    async fn export_logs(&self, _batch: &[LogRecord]) -> Result<(), TelemetryError> {
        Ok(())
    }
}
