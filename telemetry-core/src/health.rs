//! Telemetry health reporting.
//!
//! Answers "is telemetry healthy" from the circuit breaker's last-observed
//! state without touching the export path, so a health probe never amplifies
//! load during a collector outage. The check itself cannot fail; whatever
//! goes wrong is reported as unhealthy with a reason.

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::client::TelemetryClient;
use serde::Serialize;
use std::sync::Arc;

/// Overall telemetry health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Export path fully operational
    Healthy,
    /// Breaker is probing backend recovery
    Degraded,
    /// Export path short-circuited
    Unhealthy,
}

impl HealthStatus {
    /// String form used in logs and responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Detail section of a health report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDetails {
    /// Circuit breaker state at check time
    pub circuit_breaker: CircuitState,
    /// Consecutive export failures observed
    pub consecutive_failures: u32,
    /// Seconds the circuit has been open, if open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_for_secs: Option<u64>,
    /// Human-readable reason when not healthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of a telemetry health check, serializable for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Overall status
    pub status: HealthStatus,
    /// Supporting detail
    pub details: HealthDetails,
}

impl HealthReport {
    /// HTTP status code the health endpoint should return for this report.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self.status {
            HealthStatus::Healthy => 200,
            HealthStatus::Degraded | HealthStatus::Unhealthy => 503,
        }
    }

    /// Serialize to the health endpoint's JSON body.
    ///
    /// Infallible: a serialization fault degrades to a hand-built unhealthy
    /// body rather than an error.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(
                r#"{{"status":"unhealthy","details":{{"circuit_breaker":"{}","reason":"health report serialization failed: {}"}}}}"#,
                self.details.circuit_breaker.as_str(),
                err
            )
        })
    }
}

/// Read-only health view over a client's circuit breaker.
pub struct HealthMonitor {
    breaker: Arc<CircuitBreaker>,
}

impl HealthMonitor {
    /// Create a monitor observing the given client.
    #[must_use]
    pub fn new(client: &TelemetryClient) -> Self {
        Self {
            breaker: client.circuit_breaker(),
        }
    }

    /// Check telemetry health.
    ///
    /// Maps breaker state to overall health: closed is healthy, half-open is
    /// degraded, open is unhealthy. Never performs an exporter call and never
    /// fails.
    pub async fn check_health(&self) -> HealthReport {
        let snapshot = self.breaker.snapshot().await;
        let (status, reason) = match snapshot.state {
            CircuitState::Closed => (HealthStatus::Healthy, None),
            CircuitState::HalfOpen => (
                HealthStatus::Degraded,
                Some("probing telemetry backend recovery".to_string()),
            ),
            CircuitState::Open => (
                HealthStatus::Unhealthy,
                Some("telemetry backend unavailable".to_string()),
            ),
        };
        HealthReport {
            status,
            details: HealthDetails {
                circuit_breaker: snapshot.state,
                consecutive_failures: snapshot.consecutive_failures,
                open_for_secs: snapshot.open_for.map(|d| d.as_secs()),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitBreakerConfig;
    use crate::config::TelemetryConfig;
    use crate::exporter::NoopExporter;
    use std::time::Duration;

    fn client_with_threshold(threshold: u32, recovery: Duration) -> TelemetryClient {
        let config = TelemetryConfig::default().with_circuit_breaker(
            CircuitBreakerConfig::default()
                .with_failure_threshold(threshold)
                .with_recovery_timeout(recovery),
        );
        TelemetryClient::new(config, Arc::new(NoopExporter))
    }

    #[tokio::test]
    async fn test_closed_maps_to_healthy() {
        let client = client_with_threshold(5, Duration::from_secs(30));
        let monitor = HealthMonitor::new(&client);

        let report = monitor.check_health().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.details.circuit_breaker, CircuitState::Closed);
        assert!(report.details.reason.is_none());
        assert_eq!(report.http_status(), 200);
    }

    #[tokio::test]
    async fn test_open_maps_to_unhealthy() {
        let client = client_with_threshold(1, Duration::from_secs(30));
        let monitor = HealthMonitor::new(&client);
        client.circuit_breaker().record_outcome(false).await;

        let report = monitor.check_health().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.details.circuit_breaker, CircuitState::Open);
        assert!(report.details.open_for_secs.is_some());
        assert_eq!(report.http_status(), 503);
    }

    #[tokio::test]
    async fn test_half_open_maps_to_degraded() {
        let client = client_with_threshold(1, Duration::from_millis(1));
        let monitor = HealthMonitor::new(&client);
        client.circuit_breaker().record_outcome(false).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let report = monitor.check_health().await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.details.circuit_breaker, CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_json_shape() {
        let client = client_with_threshold(1, Duration::from_secs(30));
        let monitor = HealthMonitor::new(&client);
        client.circuit_breaker().record_outcome(false).await;

        let json = monitor.check_health().await.to_json();
        assert!(json.contains(r#""status":"unhealthy""#));
        assert!(json.contains(r#""circuit_breaker":"open""#));
        assert!(json.contains(r#""reason":"telemetry backend unavailable""#));
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(HealthStatus::Healthy.as_str(), "healthy");
        assert_eq!(HealthStatus::Degraded.as_str(), "degraded");
        assert_eq!(HealthStatus::Unhealthy.as_str(), "unhealthy");
    }
}
