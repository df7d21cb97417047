//! Test fixtures with sample data.
//!
//! This module provides pre-built configurations and records tuned for fast
//! tests: single-span batches, tiny recovery timeouts, short export deadlines.

use std::time::Duration;
use telemetry_core::attributes::{attrs, Attributes};
use telemetry_core::circuit_breaker::CircuitBreakerConfig;
use telemetry_core::config::TelemetryConfig;
use telemetry_core::logs::{LogLevel, LogRecord};

/// Config that flushes every span immediately and recovers quickly.
#[must_use]
pub fn fast_config() -> TelemetryConfig {
    TelemetryConfig::default()
        .with_service_name("test-service")
        .with_environment("test")
        .with_batch_sizes(1, 1024, 1024)
        .with_export_timeout(Duration::from_millis(250))
        .with_shutdown_timeout(Duration::from_secs(1))
        .with_circuit_breaker(
            CircuitBreakerConfig::default()
                .with_failure_threshold(5)
                .with_recovery_timeout(Duration::from_millis(50)),
        )
}

/// Sample cache-operation attributes.
#[must_use]
pub fn cache_attributes() -> Attributes {
    attrs([
        ("cache.key", "user:42".into()),
        ("cache.hit", false.into()),
    ])
}

/// Sample log record with trace correlation metadata.
#[must_use]
pub fn sample_log_record() -> LogRecord {
    LogRecord::new(LogLevel::Info, "payment accepted", "test-service")
        .with_metadata("order_id", "ord-1234")
}
