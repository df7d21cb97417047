//! Instrumentation wrapper behavior: pass-through of values/errors, timing
//! events, span lifecycle, and concurrency isolation.
//!
//! These exercise only the public API, so they live as black-box integration
//! tests: the lib's own `#[cfg(test)]` module cannot depend on `test-utils`
//! without linking two copies of `telemetry-core`.

use std::sync::Arc;
use std::time::Duration;
use telemetry_core::{
    attrs, measured, traced, track_errors, AttrValue, SpanStatus, TelemetryClient, TelemetryConfig,
};
use test_utils::mocks::MockExporter;

fn fast_client(exporter: Arc<MockExporter>) -> TelemetryClient {
    let config = TelemetryConfig::default()
        .with_service_name("test-service")
        .with_batch_sizes(1, 1024, 1024);
    TelemetryClient::new(config, exporter)
}

#[tokio::test]
async fn test_value_passes_through_unchanged() {
    let exporter = Arc::new(MockExporter::new());
    let client = fast_client(Arc::clone(&exporter));
    let client = &client;

    let result: Result<u32, String> = traced(client, "op", attrs([]), |span| {
        async move {
            measured(client, Duration::from_secs(5), "op", span, |span| {
                async move {
                    track_errors(client, "op", span, |span| async move { (span, Ok(7)) })
                        .await
                }
            })
            .await
        }
    })
    .await;

    assert_eq!(result, Ok(7));
    assert_eq!(exporter.spans().await.len(), 1);
}

#[tokio::test]
async fn test_error_passes_through_unchanged() {
    let exporter = Arc::new(MockExporter::new());
    let client = fast_client(Arc::clone(&exporter));

    let result: Result<u32, String> = traced(&client, "op", attrs([]), |span| {
        async move { (span, Err("boom".to_string())) }
    })
    .await;

    assert_eq!(result, Err("boom".to_string()));

    let spans = exporter.spans().await;
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].status, SpanStatus::Error);
    assert_eq!(spans[0].status_description.as_deref(), Some("boom"));

    client.flush().await;
    let metrics = exporter.metrics().await;
    assert!(metrics.iter().any(|p| p.name == "app.error.count"));
}

#[tokio::test]
async fn test_span_count_returns_to_baseline() {
    let exporter = Arc::new(MockExporter::new());
    let client = fast_client(Arc::clone(&exporter));
    assert_eq!(client.open_span_count(), 0);

    let _ok: Result<(), String> =
        traced(&client, "ok", attrs([]), |span| async move { (span, Ok(())) }).await;
    assert_eq!(client.open_span_count(), 0);

    let _err: Result<(), String> = traced(&client, "err", attrs([]), |span| {
        async move { (span, Err("boom".to_string())) }
    })
    .await;
    assert_eq!(client.open_span_count(), 0);
}

#[tokio::test]
async fn test_slow_call_emits_one_event() {
    let exporter = Arc::new(MockExporter::new());
    let client = fast_client(Arc::clone(&exporter));
    let client = &client;
    let threshold = Duration::from_millis(10);

    let result: Result<(), String> = traced(client, "slow.op", attrs([]), |span| {
        async move {
            measured(client, threshold, "slow.op", span, |span| {
                async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    (span, Ok(()))
                }
            })
            .await
        }
    })
    .await;
    assert!(result.is_ok());

    let spans = exporter.spans().await;
    let slow_events: Vec<_> = spans[0]
        .events
        .iter()
        .filter(|e| e.name == "slow_call")
        .collect();
    assert_eq!(slow_events.len(), 1);

    match slow_events[0].attributes.get("func.duration_ms") {
        Some(AttrValue::Float(ms)) => assert!(*ms >= 10.0),
        other => panic!("missing duration attribute: {other:?}"),
    }
    assert_eq!(
        spans[0].attributes.get("func.slow_call"),
        Some(&AttrValue::Bool(true))
    );
}

#[tokio::test]
async fn test_fast_call_emits_no_slow_event() {
    let exporter = Arc::new(MockExporter::new());
    let client = fast_client(Arc::clone(&exporter));
    let client = &client;

    let result: Result<(), String> = traced(client, "fast.op", attrs([]), |span| {
        async move {
            measured(client, Duration::from_secs(5), "fast.op", span, |span| {
                async move { (span, Ok(())) }
            })
            .await
        }
    })
    .await;
    assert!(result.is_ok());

    let spans = exporter.spans().await;
    assert!(spans[0].events.iter().all(|e| e.name != "slow_call"));
}

#[tokio::test]
async fn test_concurrent_calls_get_distinct_spans() {
    let exporter = Arc::new(MockExporter::new());
    let client = Arc::new(fast_client(Arc::clone(&exporter)));

    let a = {
        let client = Arc::clone(&client);
        async move {
            traced(&client, "op.a", attrs([]), |span| async move {
                (span, Ok::<_, String>(1))
            })
            .await
        }
    };
    let b = {
        let client = Arc::clone(&client);
        async move {
            traced(&client, "op.b", attrs([]), |span| async move {
                (span, Ok::<_, String>(2))
            })
            .await
        }
    };
    let (ra, rb) = tokio::join!(a, b);
    assert_eq!(ra, Ok(1));
    assert_eq!(rb, Ok(2));

    let spans = exporter.spans().await;
    assert_eq!(spans.len(), 2);
    assert_ne!(spans[0].span_id, spans[1].span_id);
    assert_ne!(spans[0].trace_id, spans[1].trace_id);
}
