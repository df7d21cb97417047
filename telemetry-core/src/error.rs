//! Centralized error types for the telemetry core.
//!
//! Errors are classified by whether they represent a fault of the exporter
//! path. Only exporter faults feed the circuit breaker; everything else is a
//! local defect and never affects breaker state.

use std::time::Duration;
use thiserror::Error;

/// Common error type for telemetry operations.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Export attempt failed (network, backend rejection)
    #[error("export failed: {0}")]
    ExportFailed(String),

    /// Export attempt exceeded its bounded timeout
    #[error("export timed out after {0:?}")]
    ExportTimeout(Duration),

    /// Circuit breaker is open for the given signal
    #[error("circuit breaker open for {signal}")]
    CircuitOpen {
        /// The telemetry signal whose export was short-circuited
        signal: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Shutdown did not complete within its configured timeout
    #[error("shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl TelemetryError {
    /// Check if this error represents a fault of the exporter path.
    ///
    /// Exporter faults are reported to the circuit breaker so that breaker
    /// state tracks live exporter health. Local defects are not.
    ///
    /// # Examples
    ///
    /// ```
    /// use telemetry_core::TelemetryError;
    ///
    /// let err = TelemetryError::export_failed("connection refused");
    /// assert!(err.is_exporter_fault());
    ///
    /// let err = TelemetryError::internal("bad instrument");
    /// assert!(!err.is_exporter_fault());
    /// ```
    #[must_use]
    pub const fn is_exporter_fault(&self) -> bool {
        matches!(self, Self::ExportFailed(_) | Self::ExportTimeout(_))
    }

    /// Create an export failure error with the given message.
    #[must_use]
    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::ExportFailed(msg.into())
    }

    /// Create a circuit open error for the given signal.
    #[must_use]
    pub fn circuit_open(signal: impl Into<String>) -> Self {
        Self::CircuitOpen {
            signal: signal.into(),
        }
    }

    /// Create an internal error with the given message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
