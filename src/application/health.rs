//! Health monitor - throttled health reporting for the persona pipeline.
//!
//! Combines a circuit breaker snapshot and cache counters into a
//! point-in-time report, throttles active checks independently of request
//! volume, and emits a flat key-value record for the external log pipeline.

use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{BreakerSnapshot, CacheStats, CircuitState};

/// Health monitor tuning.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Minimum interval between active health checks.
    pub check_interval: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
        }
    }
}

/// Point-in-time health snapshot. Produced on demand, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Circuit state at report time.
    pub circuit_state: CircuitState,
    /// Failure rate over the breaker's rolling window.
    pub failure_rate: f64,
    /// Cache hit rate since process start.
    pub cache_hit_rate: f64,
    /// Entries currently in the cache.
    pub cache_entries: usize,
    /// Times the circuit has opened since process start.
    pub times_opened: u64,
    /// When this report was generated.
    pub checked_at: Timestamp,
    /// Overall verdict: the pipeline is taking live traffic.
    pub healthy: bool,
}

/// Throttled health reporting over injected metric sources.
#[derive(Debug)]
pub struct HealthMonitor {
    config: HealthConfig,
    last_check: Mutex<Option<Timestamp>>,
}

impl HealthMonitor {
    /// Creates a monitor with the given configuration.
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            last_check: Mutex::new(None),
        }
    }

    /// Whether an active check is due at `now` given the last check time.
    ///
    /// Pure throttling rule, exposed for reuse and tests.
    pub fn is_due(now: Timestamp, last_check: Option<Timestamp>, interval: Duration) -> bool {
        match last_check {
            None => true,
            Some(last) => now.millis_since(&last) >= interval.as_millis() as u64,
        }
    }

    /// Whether an active check should run now.
    ///
    /// Returns `true` at most once per configured interval regardless of
    /// how often it is called; a `true` result claims the slot.
    pub fn should_check(&self) -> bool {
        let now = Timestamp::now();
        let mut last = self.last_check.lock().unwrap_or_else(|e| e.into_inner());
        if Self::is_due(now, *last, self.config.check_interval) {
            *last = Some(now);
            true
        } else {
            false
        }
    }

    /// Builds a report from the breaker snapshot and cache counters.
    pub fn generate_report(&self, breaker: &BreakerSnapshot, cache: &CacheStats) -> HealthReport {
        HealthReport {
            circuit_state: breaker.state,
            failure_rate: breaker.failure_rate(),
            cache_hit_rate: cache.hit_rate(),
            cache_entries: cache.entries,
            times_opened: breaker.times_opened,
            checked_at: Timestamp::now(),
            healthy: breaker.state != CircuitState::Open,
        }
    }

    /// Emits the report as a flat key-value record via `tracing`.
    ///
    /// The concrete sink (log pipeline, metrics shipper) subscribes
    /// externally; nothing here mandates a wire format beyond flat fields.
    pub fn log_report(&self, report: &HealthReport) {
        tracing::info!(
            target: "persona_edge::health",
            circuit_state = report.circuit_state.as_str(),
            failure_rate = report.failure_rate,
            cache_hit_rate = report.cache_hit_rate,
            cache_entries = report.cache_entries,
            times_opened = report.times_opened,
            checked_at = report.checked_at.as_unix_secs(),
            healthy = report.healthy,
            "persona pipeline health"
        );
    }
}
