//! Circuit breaker protecting the application from a failing telemetry backend.
//!
//! Exporter calls are network I/O to a collector and must never add unbounded
//! latency to the instrumented application. The breaker turns exporter
//! unavailability into a fast, bounded no-op path: it never blocks and never
//! errors, it only advises.

use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Circuit is closed, export attempts are allowed
    Closed,
    /// Circuit is open, export attempts are short-circuited
    Open,
    /// Circuit is half-open, trial export attempts are allowed to probe recovery
    HalfOpen,
}

impl CircuitState {
    /// String form used in health reports and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Time to wait before transitioning from open to half-open
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new config with custom failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Create a new config with custom recovery timeout.
    #[must_use]
    pub const fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }
}

/// Point-in-time view of breaker state for health reporting.
#[derive(Debug, Clone)]
pub struct BreakerSnapshot {
    /// Current state
    pub state: CircuitState,
    /// Consecutive failure count
    pub consecutive_failures: u32,
    /// How long the circuit has been open, if open
    pub open_for: Option<Duration>,
}

/// Circuit breaker for the telemetry export path.
///
/// State transitions:
/// - `Closed` -> `Open` when consecutive failures reach the threshold
/// - `Open` -> `HalfOpen` once the recovery timeout elapses, evaluated lazily
///   on the next query rather than by a background timer
/// - `HalfOpen` -> `Closed` on the next reported success
/// - `HalfOpen` -> `Open` on the next reported failure
///
/// In the half-open state all concurrent callers are admitted rather than a
/// single trial request; with export batches in flight concurrently, gating a
/// single probe would need a ticket handoff that buys little here since every
/// admitted outcome feeds back into the same state machine.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    failures: AtomicU32,
    last_failure: RwLock<Option<Instant>>,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CircuitState::Closed),
            failures: AtomicU32::new(0),
            last_failure: RwLock::new(None),
            opened_at: RwLock::new(None),
        }
    }

    /// Create a circuit breaker with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }

    /// Check if an export attempt is allowed.
    ///
    /// Returns `true` in the closed and half-open states, `false` while open.
    /// Never blocks the caller beyond the state lock.
    pub async fn allow_request(&self) -> bool {
        !matches!(self.state().await, CircuitState::Open)
    }

    /// Report the outcome of an export attempt.
    pub async fn record_outcome(&self, success: bool) {
        if success {
            self.record_success().await;
        } else {
            self.record_failure().await;
        }
    }

    async fn record_success(&self) {
        let state = *self.state.read().await;
        match state {
            CircuitState::HalfOpen => {
                *self.state.write().await = CircuitState::Closed;
                self.failures.store(0, Ordering::SeqCst);
                *self.opened_at.write().await = None;
                info!("telemetry circuit closed after successful trial export");
            }
            CircuitState::Closed => {
                self.failures.store(0, Ordering::SeqCst);
            }
            CircuitState::Open => {
                // Late outcome from an attempt admitted before opening; ignore.
            }
        }
    }

    async fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_failure.write().await = Some(Instant::now());

        let state = *self.state.read().await;
        match state {
            CircuitState::Closed => {
                if failures >= self.config.failure_threshold {
                    *self.state.write().await = CircuitState::Open;
                    *self.opened_at.write().await = Some(Instant::now());
                    warn!(
                        consecutive_failures = failures,
                        "telemetry circuit opened, export attempts short-circuited"
                    );
                }
            }
            CircuitState::HalfOpen => {
                *self.state.write().await = CircuitState::Open;
                *self.opened_at.write().await = Some(Instant::now());
                warn!("telemetry trial export failed, circuit reopened");
            }
            CircuitState::Open => {
                // Already open, nothing to do.
            }
        }
    }

    /// Get the current circuit state.
    ///
    /// An open circuit whose recovery timeout has elapsed transitions to
    /// half-open here, so health queries and `allow_request` observe the same
    /// state without a background timer.
    pub async fn state(&self) -> CircuitState {
        let current = *self.state.read().await;
        if current == CircuitState::Open && self.recovery_elapsed().await {
            let mut state = self.state.write().await;
            // Re-check under the write lock; a concurrent caller may have
            // already transitioned or reopened.
            if *state == CircuitState::Open {
                *state = CircuitState::HalfOpen;
                info!("telemetry circuit half-open, admitting trial exports");
            }
            return *state;
        }
        current
    }

    async fn recovery_elapsed(&self) -> bool {
        self.opened_at
            .read()
            .await
            .is_some_and(|t| t.elapsed() >= self.config.recovery_timeout)
    }

    /// Get the current consecutive failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Get a point-in-time snapshot for health reporting.
    pub async fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state().await;
        let open_for = self.opened_at.read().await.map(|t| t.elapsed());
        BreakerSnapshot {
            state,
            consecutive_failures: self.failure_count(),
            open_for: if state == CircuitState::Open {
                open_for
            } else {
                None
            },
        }
    }

    /// Reset the circuit breaker to the closed state.
    ///
    /// Used only at explicit shutdown/reinitialization, never on the hot path.
    pub async fn reset(&self) {
        *self.state.write().await = CircuitState::Closed;
        self.failures.store(0, Ordering::SeqCst);
        *self.last_failure.write().await = None;
        *self.opened_at.write().await = None;
    }
}
