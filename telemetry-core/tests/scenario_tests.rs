//! End-to-end scenarios for the telemetry core: exporter outages, breaker
//! recovery, shutdown, and trace assembly across the public API.

use std::sync::Arc;
use std::time::Duration;
use telemetry_core::{
    attrs, traced, Attributes, CircuitBreakerConfig, CircuitState, HealthMonitor, HealthStatus,
    SpanKind, TelemetryClient,
};
use test_utils::fixtures::fast_config;
use test_utils::mocks::MockExporter;

#[tokio::test]
async fn test_exporter_outage_opens_breaker_and_skips_attempts() {
    let exporter = Arc::new(MockExporter::failing());
    let client = TelemetryClient::new(fast_config(), exporter.clone());
    let monitor = HealthMonitor::new(&client);

    // Five wrapped calls, each forcing one failed export attempt.
    for i in 0..5u32 {
        let result: Result<u32, String> =
            traced(&client, "orders.load", attrs([]), |span| async move {
                (span, Ok(i))
            })
            .await;
        assert_eq!(result, Ok(i));
    }
    assert_eq!(exporter.span_export_calls(), 5);
    assert_eq!(client.circuit_breaker().state().await, CircuitState::Open);

    // The sixth call returns the application result unaffected and skips the
    // exporter entirely.
    let result: Result<u32, String> =
        traced(&client, "orders.load", attrs([]), |span| async move {
            (span, Ok(99))
        })
        .await;
    assert_eq!(result, Ok(99));
    assert_eq!(exporter.span_export_calls(), 5);

    let report = monitor.check_health().await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.details.circuit_breaker, CircuitState::Open);
}

#[tokio::test]
async fn test_recovery_closes_breaker_and_restores_health() {
    let exporter = Arc::new(MockExporter::failing());
    let client = TelemetryClient::new(fast_config(), exporter.clone());
    let monitor = HealthMonitor::new(&client);

    for _ in 0..5 {
        client.circuit_breaker().record_outcome(false).await;
    }
    assert_eq!(client.circuit_breaker().state().await, CircuitState::Open);

    // Wait past the recovery timeout, then let one successful export through.
    tokio::time::sleep(Duration::from_millis(60)).await;
    exporter.set_failing(false);

    let result: Result<(), String> =
        traced(&client, "orders.load", attrs([]), |span| async move {
            (span, Ok(()))
        })
        .await;
    assert!(result.is_ok());

    assert_eq!(client.circuit_breaker().state().await, CircuitState::Closed);
    assert_eq!(client.circuit_breaker().failure_count(), 0);

    let report = monitor.check_health().await;
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.http_status(), 200);
}

#[tokio::test]
async fn test_shutdown_twice_is_noop() {
    let exporter = Arc::new(MockExporter::new());
    let client = TelemetryClient::new(fast_config(), exporter.clone());

    client.record_counter("app.request.count", 1, Attributes::new());
    client.log_info("closing down").await;

    assert!(client.shutdown().await.is_ok());
    let calls_after_first = exporter.total_export_calls();
    assert!(calls_after_first > 0);
    assert_eq!(exporter.shutdown_calls(), 1);

    // The second call is a true no-op: nothing is re-flushed.
    assert!(client.shutdown().await.is_ok());
    assert_eq!(exporter.total_export_calls(), calls_after_first);
    assert_eq!(exporter.shutdown_calls(), 1);
}

#[tokio::test]
async fn test_export_timeout_counts_as_failure() {
    let exporter = Arc::new(MockExporter::with_delay(Duration::from_millis(100)));
    let config = fast_config()
        .with_export_timeout(Duration::from_millis(10))
        .with_circuit_breaker(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_recovery_timeout(Duration::from_secs(60)),
        );
    let client = TelemetryClient::new(config, exporter.clone());

    let result: Result<(), String> =
        traced(&client, "orders.load", attrs([]), |span| async move {
            (span, Ok(()))
        })
        .await;
    assert!(result.is_ok());

    assert_eq!(client.circuit_breaker().state().await, CircuitState::Open);
    assert_eq!(client.export_metrics().failures.get(), 1);

    let report = HealthMonitor::new(&client).check_health().await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_circuit_open_logs_fall_back_to_local() {
    let exporter = Arc::new(MockExporter::new());
    let config = fast_config()
        .with_batch_sizes(1, 1024, 2)
        .with_circuit_breaker(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_recovery_timeout(Duration::from_secs(60)),
        );
    let client = TelemetryClient::new(config, exporter.clone());

    client.circuit_breaker().record_outcome(false).await;
    assert_eq!(client.circuit_breaker().state().await, CircuitState::Open);

    client.log_info("first").await;
    client.log_info("second").await;

    // Batch size reached, but the collector path is short-circuited; records
    // were delivered to the local subscriber instead of being lost.
    assert_eq!(client.pending_log_count(), 0);
    assert_eq!(exporter.log_export_calls(), 0);
}

#[tokio::test]
async fn test_request_trace_parentage() {
    let exporter = Arc::new(MockExporter::new());
    let client = TelemetryClient::new(fast_config(), exporter.clone());

    let request = client.start_request_span("POST", "/orders", None).await;
    let ctx = request.context();

    let db = client
        .child_span(&ctx, "db.insert", SpanKind::Client, Attributes::new())
        .await;
    db.end();

    let cache = client.span_cache_operation("get", Attributes::new()).await;
    cache.end();

    request.end();
    client.flush().await;

    let spans = exporter.spans().await;
    assert_eq!(spans.len(), 3);

    let request_span = spans.iter().find(|s| s.name == "POST /orders").unwrap();
    let db_span = spans.iter().find(|s| s.name == "db.insert").unwrap();
    let cache_span = spans.iter().find(|s| s.name == "cache.get").unwrap();

    assert_eq!(request_span.kind, SpanKind::Server);
    assert_eq!(request_span.parent_id, None);
    assert_eq!(db_span.trace_id, request_span.trace_id);
    assert_eq!(db_span.parent_id.as_deref(), Some(request_span.span_id.as_str()));
    // The cache helper starts its own root trace.
    assert_eq!(cache_span.parent_id, None);
    assert_ne!(cache_span.trace_id, request_span.trace_id);
}
