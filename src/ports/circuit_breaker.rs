//! CircuitBreaker port - Resilience state machine for the classification pipeline.
//!
//! The circuit breaker stops calling the classification collaborator once it
//! is evidently failing, lets the fallback path absorb the traffic, and
//! cautiously probes recovery after a cooldown.
//!
//! ## States
//!
//! - **Closed**: Normal operation, classification attempts pass through
//! - **Open**: Too many recent failures, attempts rejected immediately
//! - **Half-Open**: Cooldown elapsed, a bounded number of probes allowed
//!
//! ## Transitions
//!
//! ```text
//! Closed --[failures in rolling window >= failure_threshold]--> Open
//! Open --[cooldown elapsed, next allow check]--> Half-Open
//! Half-Open --[probe success]--> Closed (counters reset)
//! Half-Open --[probe failure]--> Open (cooldown restarts)
//! ```

use serde::Serialize;
use std::time::Duration;

use crate::domain::foundation::Timestamp;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - attempts flow through to the classifier.
    Closed,

    /// Too many failures - attempts rejected without calling the classifier.
    /// Transitions to HalfOpen once the cooldown elapses.
    Open,

    /// Testing recovery - a bounded number of probe attempts allowed.
    HalfOpen,
}

impl CircuitState {
    /// Wire representation used in health reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Configuration for circuit breaker behavior.
///
/// Invalid combinations (zero threshold, window smaller than threshold) are
/// rejected at startup by config validation, never at request time.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Failures within the rolling window that open the circuit.
    pub failure_threshold: u32,

    /// Size of the rolling outcome window, in attempts.
    pub window_size: u32,

    /// Time to wait in Open before allowing a recovery probe.
    pub cooldown: Duration,

    /// Probe attempts allowed while half-open before gating resumes.
    pub half_open_max_probes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            window_size: 20,
            cooldown: Duration::from_secs(30),
            half_open_max_probes: 1,
        }
    }
}

/// Read-only copy of breaker state for reporting.
///
/// Owned exclusively by the breaker; everything else sees snapshots.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreakerSnapshot {
    /// Current state.
    pub state: CircuitState,
    /// Failures in a row, reset by any success.
    pub consecutive_failures: u32,
    /// Successes currently inside the rolling window.
    pub window_successes: u32,
    /// Failures currently inside the rolling window.
    pub window_failures: u32,
    /// Times the circuit has opened since process start.
    pub times_opened: u64,
    /// When the breaker last changed state.
    pub last_transition_at: Timestamp,
    /// When the last failure was recorded, if any.
    pub last_failure_at: Option<Timestamp>,
}

impl BreakerSnapshot {
    /// Failure rate over the rolling window, 0.0 when the window is empty.
    pub fn failure_rate(&self) -> f64 {
        let total = self.window_successes + self.window_failures;
        if total == 0 {
            return 0.0;
        }
        self.window_failures as f64 / total as f64
    }
}

/// Port for circuit breaker functionality.
///
/// All mutations must be atomic with respect to concurrent requests: two
/// simultaneous failures must not double-trigger a transition or corrupt
/// the counters.
pub trait CircuitBreaker: Send + Sync {
    /// Current state of the circuit.
    ///
    /// Pure read: observing the state never transitions it. The
    /// Open -> HalfOpen move happens on [`should_allow`](CircuitBreaker::should_allow).
    fn state(&self) -> CircuitState;

    /// Whether a classification attempt should be made now.
    ///
    /// Returns `true` in Closed, and in HalfOpen while probe permits
    /// remain - each `true` in HalfOpen consumes one permit. Returns
    /// `false` in Open, except that the first call after the cooldown
    /// elapses moves the circuit to HalfOpen and claims a probe permit.
    fn should_allow(&self) -> bool;

    /// Records a successful classification.
    ///
    /// In HalfOpen a success closes the circuit and resets counters.
    fn record_success(&self);

    /// Records a failed or timed-out classification.
    ///
    /// In Closed this may open the circuit; in HalfOpen it reopens it and
    /// restarts the cooldown.
    fn record_failure(&self);

    /// Force-resets the circuit to Closed with empty counters.
    ///
    /// Administrative intervention only.
    fn reset(&self);

    /// Read-only snapshot for health reporting.
    fn snapshot(&self) -> BreakerSnapshot;
}
