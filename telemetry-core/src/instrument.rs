//! Composable instrumentation wrappers: tracing, error capture, and
//! performance measurement around arbitrary async operations.
//!
//! Each wrapper takes the next callable and is pass-through: the wrapped
//! operation's value and error come back unchanged. The span travels through
//! the chain by value, so every invocation owns its own span and nothing is
//! shared across concurrent calls. Nest the wrappers in whatever order the
//! call site needs; the conventional order is resource acquisition outermost,
//! then tracing/error/timing, then data transforms closest to the operation.
//!
//! ```
//! use std::sync::Arc;
//! use telemetry_core::attributes::attrs;
//! use telemetry_core::client::TelemetryClient;
//! use telemetry_core::config::TelemetryConfig;
//! use telemetry_core::exporter::NoopExporter;
//! use telemetry_core::instrument::{measured, traced};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let client = TelemetryClient::new(TelemetryConfig::default(), Arc::new(NoopExporter));
//! let client = &client;
//! let threshold = client.config().slow_call_threshold;
//! let result: Result<u32, String> = traced(client, "orders.load", attrs([]), |span| {
//!     async move {
//!         measured(client, threshold, "orders.load", span, |span| {
//!             async move { (span, Ok(42)) }
//!         })
//!         .await
//!     }
//! })
//! .await;
//! assert_eq!(result, Ok(42));
//! # }
//! ```

use crate::attributes::{attrs, Attributes};
use crate::client::TelemetryClient;
use crate::span::{ScopedSpan, SpanKind, SpanStatus};
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Wrap an operation in a span with outcome metrics and error capture.
///
/// Opens a span, hands it to `op`, and on completion records request count
/// and latency, captures any error into the span and the error-count metric,
/// and ends the span. The operation's result is returned unchanged. Pending
/// telemetry is flushed afterwards when a batch is due, so exporter health is
/// observed on the hot path.
pub async fn traced<F, Fut, T, E>(
    client: &TelemetryClient,
    name: &str,
    attributes: Attributes,
    op: F,
) -> Result<T, E>
where
    F: FnOnce(ScopedSpan) -> Fut,
    Fut: Future<Output = (ScopedSpan, Result<T, E>)>,
    E: Display,
{
    let started = Instant::now();
    let span = client
        .start_span(name, SpanKind::Internal, attributes)
        .await;
    let (mut span, result) = op(span).await;

    let status = if result.is_ok() { "success" } else { "error" };
    match &result {
        Ok(_) => span.set_status(SpanStatus::Ok),
        Err(err) => {
            span.record_error(err);
            client.record_counter("app.error.count", 1, attrs([("function", name.into())]));
            error!(function = name, error = %err, "error in traced operation");
        }
    }

    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    span.set_attribute("func.duration_ms", duration_ms);
    span.set_attribute("func.status", status);
    span.end();

    client.record_counter(
        "app.request.count",
        1,
        attrs([("function", name.into()), ("status", status.into())]),
    );
    client.record_histogram(
        "app.request.latency.ms",
        duration_ms,
        attrs([("function", name.into())]),
    );
    client.flush_if_due().await;

    result
}

/// Capture any error from `op` into the span and the error-count metric,
/// then hand the error back unchanged.
pub async fn track_errors<F, Fut, T, E>(
    client: &TelemetryClient,
    function: &str,
    span: ScopedSpan,
    op: F,
) -> (ScopedSpan, Result<T, E>)
where
    F: FnOnce(ScopedSpan) -> Fut,
    Fut: Future<Output = (ScopedSpan, Result<T, E>)>,
    E: Display,
{
    let (mut span, result) = op(span).await;
    if let Err(err) = &result {
        span.record_error(err);
        client.record_counter(
            "app.error.count",
            1,
            attrs([("function", function.into())]),
        );
        error!(function, error = %err, "error captured in operation");
    }
    (span, result)
}

/// Measure `op` against a slow-call threshold.
///
/// When the measured duration exceeds the threshold, exactly one `slow_call`
/// event is recorded on the span, carrying the duration and threshold, along
/// with a slow-tagged latency point and a warning log. The operation's output
/// is returned unchanged.
pub async fn measured<F, Fut, T>(
    client: &TelemetryClient,
    threshold: Duration,
    function: &str,
    span: ScopedSpan,
    op: F,
) -> (ScopedSpan, T)
where
    F: FnOnce(ScopedSpan) -> Fut,
    Fut: Future<Output = (ScopedSpan, T)>,
{
    let started = Instant::now();
    let (mut span, out) = op(span).await;
    let elapsed = started.elapsed();

    if elapsed > threshold {
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        let threshold_ms = threshold.as_secs_f64() * 1000.0;
        warn!(function, duration_ms, threshold_ms, "slow call");
        span.set_attribute("func.slow_call", true);
        span.add_event(
            "slow_call",
            attrs([
                ("func.duration_ms", duration_ms.into()),
                ("func.threshold_ms", threshold_ms.into()),
            ]),
        );
        client.record_histogram(
            "app.request.latency.ms",
            duration_ms,
            attrs([("function", function.into()), ("slow", true.into())]),
        );
    }

    (span, out)
}
