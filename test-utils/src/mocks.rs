//! Mock implementations for testing.
//!
//! This module provides a scriptable exporter so tests can observe what the
//! client exports and inject backend failures or latency.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use telemetry_core::error::TelemetryError;
use telemetry_core::exporter::TelemetryExporter;
use telemetry_core::logs::LogRecord;
use telemetry_core::metrics::MetricPoint;
use telemetry_core::span::SpanData;
use tokio::sync::RwLock;

/// Mock exporter recording every batch and optionally failing or stalling.
#[derive(Debug, Default)]
pub struct MockExporter {
    failing: AtomicBool,
    delay: Option<Duration>,
    spans: RwLock<Vec<SpanData>>,
    metrics: RwLock<Vec<MetricPoint>>,
    logs: RwLock<Vec<LogRecord>>,
    span_calls: AtomicU64,
    metric_calls: AtomicU64,
    log_calls: AtomicU64,
    shutdown_calls: AtomicU64,
}

impl MockExporter {
    /// Create a mock exporter that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock exporter that fails every export attempt.
    #[must_use]
    pub fn failing() -> Self {
        let exporter = Self::default();
        exporter.failing.store(true, Ordering::SeqCst);
        exporter
    }

    /// Create a mock exporter that sleeps before answering, to exercise
    /// export timeouts.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Switch failure injection on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn answer(&self, calls: &AtomicU64) -> Result<(), TelemetryError> {
        calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TelemetryError::export_failed("injected failure"));
        }
        Ok(())
    }

    /// All spans exported so far.
    pub async fn spans(&self) -> Vec<SpanData> {
        self.spans.read().await.clone()
    }

    /// All metric points exported so far.
    pub async fn metrics(&self) -> Vec<MetricPoint> {
        self.metrics.read().await.clone()
    }

    /// All log records exported so far.
    pub async fn logs(&self) -> Vec<LogRecord> {
        self.logs.read().await.clone()
    }

    /// Number of span export attempts, including failed ones.
    #[must_use]
    pub fn span_export_calls(&self) -> u64 {
        self.span_calls.load(Ordering::SeqCst)
    }

    /// Number of metric export attempts, including failed ones.
    #[must_use]
    pub fn metric_export_calls(&self) -> u64 {
        self.metric_calls.load(Ordering::SeqCst)
    }

    /// Number of log export attempts, including failed ones.
    #[must_use]
    pub fn log_export_calls(&self) -> u64 {
        self.log_calls.load(Ordering::SeqCst)
    }

    /// Total export attempts across all signals.
    #[must_use]
    pub fn total_export_calls(&self) -> u64 {
        self.span_export_calls() + self.metric_export_calls() + self.log_export_calls()
    }

    /// Number of times `shutdown` was called.
    #[must_use]
    pub fn shutdown_calls(&self) -> u64 {
        self.shutdown_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryExporter for MockExporter {
    async fn export_spans(&self, batch: &[SpanData]) -> Result<(), TelemetryError> {
        self.answer(&self.span_calls).await?;
        self.spans.write().await.extend_from_slice(batch);
        Ok(())
    }

    async fn export_metrics(&self, batch: &[MetricPoint]) -> Result<(), TelemetryError> {
        self.answer(&self.metric_calls).await?;
        self.metrics.write().await.extend_from_slice(batch);
        Ok(())
    }

    async fn export_logs(&self, batch: &[LogRecord]) -> Result<(), TelemetryError> {
        self.answer(&self.log_calls).await?;
        self.logs.write().await.extend_from_slice(batch);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TelemetryError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
