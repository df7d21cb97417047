//! Telemetry client: the single entry point for spans, metrics, and logs.
//!
//! The client owns the span sink, metric recorder, log buffer, circuit
//! breaker, and the exporter handle. Every exporter-touching action runs with
//! a bounded timeout and reports its outcome to the breaker, so breaker state
//! tracks live exporter health. Construct one client per process at startup
//! and pass it by reference; tests construct isolated instances.

use crate::attributes::{attrs, Attributes};
use crate::buffer::BoundedQueue;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::TelemetryConfig;
use crate::error::TelemetryError;
use crate::exporter::TelemetryExporter;
use crate::logs::{LogLevel, LogRecord};
use crate::metrics::{ExportMetrics, MetricsRecorder};
use crate::span::{new_trace_id, ScopedSpan, SpanContext, SpanData, SpanKind, SpanSink};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Telemetry client handle.
pub struct TelemetryClient {
    config: TelemetryConfig,
    instance_id: String,
    resource: Attributes,
    exporter: Arc<dyn TelemetryExporter>,
    breaker: Arc<CircuitBreaker>,
    spans: Arc<SpanSink>,
    metrics: MetricsRecorder,
    logs: BoundedQueue<LogRecord>,
    export_metrics: ExportMetrics,
    shut_down: AtomicBool,
}

impl TelemetryClient {
    /// Create a new client from an immutable configuration and an exporter.
    #[must_use]
    pub fn new(config: TelemetryConfig, exporter: Arc<dyn TelemetryExporter>) -> Self {
        let instance_id = config.instance_id.clone().unwrap_or_else(|| {
            let suffix = Uuid::new_v4().simple().to_string();
            format!("{}-{}", config.service_name, &suffix[..8])
        });
        let resource = attrs([
            ("service.name", config.service_name.as_str().into()),
            ("service.version", config.service_version.as_str().into()),
            ("service.instance.id", instance_id.as_str().into()),
            ("environment", config.environment.as_str().into()),
        ]);
        info!(
            service = %config.service_name,
            instance = %instance_id,
            environment = %config.environment,
            "telemetry initialized"
        );
        Self {
            breaker: Arc::new(CircuitBreaker::new(config.circuit_breaker.clone())),
            spans: Arc::new(SpanSink::new(config.buffer_capacity)),
            metrics: MetricsRecorder::new(config.buffer_capacity),
            logs: BoundedQueue::new(config.buffer_capacity),
            export_metrics: ExportMetrics::new("telemetry"),
            shut_down: AtomicBool::new(false),
            instance_id,
            resource,
            exporter,
            config,
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// The resolved instance identifier.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The circuit breaker guarding the export path.
    #[must_use]
    pub fn circuit_breaker(&self) -> Arc<CircuitBreaker> {
        Arc::clone(&self.breaker)
    }

    /// Export-path accounting counters.
    #[must_use]
    pub const fn export_metrics(&self) -> &ExportMetrics {
        &self.export_metrics
    }

    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Start a root span.
    ///
    /// When the circuit breaker has telemetry disabled, a valid non-recording
    /// span is returned so calling code never branches on telemetry health.
    pub async fn start_span(
        &self,
        name: impl Into<String>,
        kind: SpanKind,
        attributes: Attributes,
    ) -> ScopedSpan {
        self.make_span(name, kind, new_trace_id(), None, attributes)
            .await
    }

    /// Start a child span under an explicitly passed parent context.
    pub async fn child_span(
        &self,
        parent: &SpanContext,
        name: impl Into<String>,
        kind: SpanKind,
        attributes: Attributes,
    ) -> ScopedSpan {
        self.make_span(
            name,
            kind,
            parent.trace_id.clone(),
            Some(parent.span_id.clone()),
            attributes,
        )
        .await
    }

    /// Start the server span for an incoming request.
    ///
    /// This is the primitive a framework hook calls once per request. A valid
    /// W3C `traceparent` joins the incoming distributed trace; anything else
    /// starts a fresh root.
    pub async fn start_request_span(
        &self,
        method: &str,
        target: &str,
        traceparent: Option<&str>,
    ) -> ScopedSpan {
        let name = format!("{method} {target}");
        let attributes = attrs([
            ("http.method", method.into()),
            ("http.target", target.into()),
        ]);
        match traceparent.and_then(SpanContext::parse_traceparent) {
            Some(remote) => {
                self.make_span(
                    name,
                    SpanKind::Server,
                    remote.trace_id,
                    Some(remote.span_id),
                    attributes,
                )
                .await
            }
            None => {
                self.make_span(name, SpanKind::Server, new_trace_id(), None, attributes)
                    .await
            }
        }
    }

    /// Span for a message-queue operation, named `queue.{operation}`.
    pub async fn span_queue_operation(
        &self,
        operation: &str,
        attributes: Attributes,
    ) -> ScopedSpan {
        self.start_span(format!("queue.{operation}"), SpanKind::Internal, attributes)
            .await
    }

    /// Span for a cache operation, named `cache.{operation}`.
    pub async fn span_cache_operation(
        &self,
        operation: &str,
        attributes: Attributes,
    ) -> ScopedSpan {
        self.start_span(format!("cache.{operation}"), SpanKind::Internal, attributes)
            .await
    }

    /// Span for a background-task operation, named `task.{operation}`.
    pub async fn span_task_operation(
        &self,
        operation: &str,
        attributes: Attributes,
    ) -> ScopedSpan {
        self.start_span(format!("task.{operation}"), SpanKind::Internal, attributes)
            .await
    }

    async fn make_span(
        &self,
        name: impl Into<String>,
        kind: SpanKind,
        trace_id: String,
        parent_id: Option<String>,
        attributes: Attributes,
    ) -> ScopedSpan {
        let mut merged = self.resource.clone();
        merged.extend(attributes);
        let data = SpanData::new(name, kind, trace_id, parent_id, merged);
        if self.is_shut_down() || !self.breaker.allow_request().await {
            ScopedSpan::non_recording(data)
        } else {
            ScopedSpan::recording(data, Arc::clone(&self.spans))
        }
    }

    /// Append a counter increment.
    ///
    /// Non-blocking and infallible; the exporter is only touched at flush
    /// time, where the outcome feeds the circuit breaker.
    pub fn record_counter(&self, name: &str, value: u64, attributes: Attributes) {
        if self.is_shut_down() {
            return;
        }
        self.metrics.record_counter(name, value, attributes);
    }

    /// Append a histogram observation. Same contract as
    /// [`record_counter`](Self::record_counter).
    pub fn record_histogram(&self, name: &str, value: f64, attributes: Attributes) {
        if self.is_shut_down() {
            return;
        }
        self.metrics.record_histogram(name, value, attributes);
    }

    /// Buffer a log record for forwarding, flushing when the batch is full.
    pub async fn log(&self, record: LogRecord) {
        if self.is_shut_down() {
            record.log_locally();
            return;
        }
        self.logs.push(record, "logs");
        if self.logs.len() >= self.config.log_batch_size {
            self.flush_logs().await;
        }
    }

    /// Log a debug message.
    pub async fn log_debug(&self, message: impl Into<String>) {
        self.log(LogRecord::new(
            LogLevel::Debug,
            message,
            self.config.service_name.clone(),
        ))
        .await;
    }

    /// Log an info message.
    pub async fn log_info(&self, message: impl Into<String>) {
        self.log(LogRecord::new(
            LogLevel::Info,
            message,
            self.config.service_name.clone(),
        ))
        .await;
    }

    /// Log a warning message.
    pub async fn log_warn(&self, message: impl Into<String>) {
        self.log(LogRecord::new(
            LogLevel::Warn,
            message,
            self.config.service_name.clone(),
        ))
        .await;
    }

    /// Log an error message.
    pub async fn log_error(&self, message: impl Into<String>) {
        self.log(LogRecord::new(
            LogLevel::Error,
            message,
            self.config.service_name.clone(),
        ))
        .await;
    }

    /// Flush any signal whose pending buffer has reached its batch size.
    ///
    /// The instrumentation wrappers call this after each wrapped operation so
    /// exporter health is observed on the hot path without flushing every
    /// single span.
    pub async fn flush_if_due(&self) {
        if self.spans.queue.len() >= self.config.span_batch_size {
            self.flush_spans().await;
        }
        if self.metrics.pending_len() >= self.config.metric_batch_size {
            self.flush_metrics().await;
        }
        if self.logs.len() >= self.config.log_batch_size {
            self.flush_logs().await;
        }
    }

    /// Flush everything pending, regardless of batch thresholds.
    pub async fn flush(&self) {
        self.flush_spans().await;
        self.flush_metrics().await;
        self.flush_logs().await;
    }

    async fn flush_spans(&self) {
        while !self.spans.queue.is_empty() {
            if !self.breaker.allow_request().await {
                debug!(
                    pending = self.spans.queue.len(),
                    "telemetry circuit open, keeping spans buffered"
                );
                break;
            }
            let batch = self.spans.queue.drain(self.config.span_batch_size);
            if batch.is_empty() {
                break;
            }
            if !self
                .export_with_outcome("spans", self.exporter.export_spans(&batch))
                .await
            {
                break;
            }
        }
    }

    async fn flush_metrics(&self) {
        while !self.metrics.pending.is_empty() {
            if !self.breaker.allow_request().await {
                debug!(
                    pending = self.metrics.pending_len(),
                    "telemetry circuit open, keeping metrics buffered"
                );
                break;
            }
            let batch = self.metrics.pending.drain(self.config.metric_batch_size);
            if batch.is_empty() {
                break;
            }
            if !self
                .export_with_outcome("metrics", self.exporter.export_metrics(&batch))
                .await
            {
                break;
            }
        }
    }

    async fn flush_logs(&self) {
        while !self.logs.is_empty() {
            if !self.breaker.allow_request().await {
                warn!("logging circuit open, falling back to local tracing");
                for record in self.logs.drain(usize::MAX) {
                    record.log_locally();
                }
                break;
            }
            let batch = self.logs.drain(self.config.log_batch_size);
            if batch.is_empty() {
                break;
            }
            if !self
                .export_with_outcome("logs", self.exporter.export_logs(&batch))
                .await
            {
                // The batch was already drained; deliver it locally rather
                // than lose it.
                for record in &batch {
                    record.log_locally();
                }
                break;
            }
        }
    }

    /// Run one export attempt under the bounded timeout and report the
    /// outcome. Returns `true` on success.
    async fn export_with_outcome<F>(&self, signal: &'static str, export: F) -> bool
    where
        F: Future<Output = Result<(), TelemetryError>>,
    {
        match tokio::time::timeout(self.config.export_timeout, export).await {
            Ok(Ok(())) => {
                self.breaker.record_outcome(true).await;
                self.export_metrics.record_attempt(true);
                true
            }
            Ok(Err(err)) if err.is_exporter_fault() => {
                warn!(signal, error = %err, "telemetry export failed, batch dropped");
                self.breaker.record_outcome(false).await;
                self.export_metrics.record_attempt(false);
                false
            }
            Ok(Err(err)) => {
                // A non-exporter fault is a local defect; it must not trip
                // the breaker.
                warn!(signal, error = %err, "telemetry export rejected locally");
                self.export_metrics.record_attempt(false);
                false
            }
            Err(_) => {
                let err = TelemetryError::ExportTimeout(self.config.export_timeout);
                warn!(signal, error = %err, "telemetry export timed out, batch dropped");
                self.breaker.record_outcome(false).await;
                self.export_metrics.record_attempt(false);
                false
            }
        }
    }

    /// Flush all buffered telemetry and release the exporter.
    ///
    /// Blocks the caller up to the configured shutdown timeout; the one
    /// operation allowed to do so. Idempotent: the second call is a no-op and
    /// never re-flushes.
    ///
    /// # Errors
    ///
    /// Returns an error when the final flush exceeds the shutdown timeout or
    /// the exporter fails to release its resources. A repeated call returns
    /// `Ok` without touching the exporter.
    pub async fn shutdown(&self) -> Result<(), TelemetryError> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("telemetry already shut down, skipping flush");
            return Ok(());
        }
        info!("telemetry shutting down, flushing buffered data");
        let deadline = self.config.shutdown_timeout;
        match tokio::time::timeout(deadline, async {
            self.flush().await;
            self.exporter.shutdown().await
        })
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                warn!(error = %err, "exporter shutdown reported an error");
                Err(err)
            }
            Err(_) => Err(TelemetryError::ShutdownTimeout(deadline)),
        }
    }

    /// Number of spans currently started but not yet ended.
    #[must_use]
    pub fn open_span_count(&self) -> u64 {
        self.spans.open_count()
    }

    /// Number of ended spans waiting for export.
    #[must_use]
    pub fn pending_span_count(&self) -> usize {
        self.spans.queue.len()
    }

    /// Number of metric points waiting for export.
    #[must_use]
    pub fn pending_metric_count(&self) -> usize {
        self.metrics.pending_len()
    }

    /// Number of log records waiting for export.
    #[must_use]
    pub fn pending_log_count(&self) -> usize {
        self.logs.len()
    }

    /// Number of spans dropped to buffer overflow.
    #[must_use]
    pub fn dropped_span_count(&self) -> u64 {
        self.spans.queue.dropped_count()
    }

    /// Number of metric points dropped to buffer overflow.
    #[must_use]
    pub fn dropped_metric_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Number of log records dropped to buffer overflow.
    #[must_use]
    pub fn dropped_log_count(&self) -> u64 {
        self.logs.dropped_count()
    }
}
