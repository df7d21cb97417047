//! Telemetry configuration.
//!
//! The configuration is resolved once at startup (from the environment, a
//! file, or test fixtures) into an immutable struct passed by reference into
//! [`TelemetryClient::new`](crate::client::TelemetryClient::new). The core
//! never reads the environment itself.

use crate::circuit_breaker::CircuitBreakerConfig;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry client configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Collector endpoint handed to the exporter
    pub endpoint: String,
    /// Whether the exporter may use an insecure transport
    pub insecure: bool,
    /// Service name stamped onto exported telemetry
    pub service_name: String,
    /// Service version stamped onto exported telemetry
    pub service_version: String,
    /// Deployment environment (prod/stage/dev)
    pub environment: String,
    /// Instance identifier; generated from the service name when `None`
    pub instance_id: Option<String>,
    /// Circuit breaker configuration for the export path
    pub circuit_breaker: CircuitBreakerConfig,
    /// Duration above which a wrapped call is reported as slow
    pub slow_call_threshold: Duration,
    /// Spans per export batch
    pub span_batch_size: usize,
    /// Metric points per export batch
    pub metric_batch_size: usize,
    /// Log records per export batch
    pub log_batch_size: usize,
    /// Maximum buffered entries per signal while the backend is unreachable
    pub buffer_capacity: usize,
    /// Bounded timeout for a single export attempt
    pub export_timeout: Duration,
    /// Bounded timeout for the final flush during shutdown
    pub shutdown_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4317".to_string(),
            insecure: false,
            service_name: "rust-service".to_string(),
            service_version: "1.0.0".to_string(),
            environment: "development".to_string(),
            instance_id: None,
            circuit_breaker: CircuitBreakerConfig::default(),
            slow_call_threshold: Duration::from_millis(100),
            span_batch_size: 32,
            metric_batch_size: 64,
            log_batch_size: 100,
            buffer_capacity: 10_000,
            export_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl TelemetryConfig {
    /// Create config with custom collector endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom service version.
    #[must_use]
    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Create config with custom deployment environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Create config with an explicit instance identifier.
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Create config with custom circuit breaker settings.
    #[must_use]
    pub const fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// Create config with custom slow-call threshold.
    #[must_use]
    pub const fn with_slow_call_threshold(mut self, threshold: Duration) -> Self {
        self.slow_call_threshold = threshold;
        self
    }

    /// Create config with custom per-signal batch sizes.
    #[must_use]
    pub const fn with_batch_sizes(mut self, spans: usize, metrics: usize, logs: usize) -> Self {
        self.span_batch_size = spans;
        self.metric_batch_size = metrics;
        self.log_batch_size = logs;
        self
    }

    /// Create config with custom buffer capacity.
    #[must_use]
    pub const fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Create config with custom export timeout.
    #[must_use]
    pub const fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = timeout;
        self
    }

    /// Create config with custom shutdown timeout.
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Allow insecure transport to the collector.
    #[must_use]
    pub const fn with_insecure_transport(mut self) -> Self {
        self.insecure = true;
        self
    }
}

/// Local log subscriber configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name for local log output
    pub service_name: String,
    /// Log level filter
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "rust-service".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Derive local log settings from the telemetry config.
    #[must_use]
    pub fn for_service(config: &TelemetryConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            json_output: config.environment == "production",
            ..Self::default()
        }
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Initialize the local tracing subscriber.
///
/// This sets up the global subscriber that receives the crate's own `warn!`
/// and `error!` diagnostics as well as log records mirrored locally when the
/// collector is unreachable. Call once at application startup, before
/// constructing the client.
pub fn init_tracing(config: &TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.endpoint, "http://localhost:4317");
        assert!(!config.insecure);
        assert_eq!(config.service_name, "rust-service");
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.slow_call_threshold, Duration::from_millis(100));
        assert!(config.instance_id.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = TelemetryConfig::default()
            .with_endpoint("http://collector:4317")
            .with_service_name("billing")
            .with_service_version("2.3.1")
            .with_environment("production")
            .with_instance_id("billing-deadbeef")
            .with_slow_call_threshold(Duration::from_millis(250))
            .with_batch_sizes(1, 8, 16)
            .with_insecure_transport();

        assert_eq!(config.endpoint, "http://collector:4317");
        assert_eq!(config.service_name, "billing");
        assert_eq!(config.service_version, "2.3.1");
        assert_eq!(config.environment, "production");
        assert_eq!(config.instance_id.as_deref(), Some("billing-deadbeef"));
        assert_eq!(config.slow_call_threshold, Duration::from_millis(250));
        assert_eq!(config.span_batch_size, 1);
        assert_eq!(config.metric_batch_size, 8);
        assert_eq!(config.log_batch_size, 16);
        assert!(config.insecure);
    }

    #[test]
    fn test_tracing_config_for_service() {
        let telemetry = TelemetryConfig::default()
            .with_service_name("billing")
            .with_environment("production");
        let tracing = TracingConfig::for_service(&telemetry);

        assert_eq!(tracing.service_name, "billing");
        assert!(tracing.json_output);
        assert_eq!(tracing.log_level, "info");
    }
}
