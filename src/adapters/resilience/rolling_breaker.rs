//! Rolling-window circuit breaker.
//!
//! Three-state breaker over a bounded rolling window of attempt outcomes.
//! The whole state lives behind one small mutex: critical sections are a
//! few comparisons and a VecDeque push, so contention is negligible and
//! every transition is atomic - two simultaneous failures cannot
//! double-open the circuit or corrupt the counters.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::{BreakerConfig, BreakerSnapshot, CircuitBreaker, CircuitState};

/// Circuit breaker gating the classification pipeline.
///
/// One instance per process, injected into the resolver; tests construct
/// isolated instances per case.
#[derive(Debug)]
pub struct RollingCircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    /// Rolling outcome window, newest at the back. `true` = success.
    window: VecDeque<bool>,
    consecutive_failures: u32,
    /// Probe permits consumed in the current HalfOpen episode.
    probes_used: u32,
    times_opened: u64,
    last_transition_at: Timestamp,
    last_failure_at: Option<Timestamp>,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            window: VecDeque::new(),
            consecutive_failures: 0,
            probes_used: 0,
            times_opened: 0,
            last_transition_at: Timestamp::now(),
            last_failure_at: None,
        }
    }

    fn window_failures(&self) -> u32 {
        self.window.iter().filter(|ok| !**ok).count() as u32
    }

    fn window_successes(&self) -> u32 {
        self.window.iter().filter(|ok| **ok).count() as u32
    }

    fn push_outcome(&mut self, success: bool, window_size: u32) {
        self.window.push_back(success);
        while self.window.len() > window_size as usize {
            self.window.pop_front();
        }
    }

    fn transition(&mut self, to: CircuitState) {
        tracing::warn!(
            from = self.state.as_str(),
            to = to.as_str(),
            window_failures = self.window_failures(),
            "circuit breaker state change"
        );
        self.state = to;
        self.last_transition_at = Timestamp::now();
    }
}

impl RollingCircuitBreaker {
    /// Creates a breaker with the given configuration.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Creates a breaker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BreakerConfig::default())
    }

    fn cooldown_elapsed(&self, inner: &Inner) -> bool {
        Timestamp::now().millis_since(&inner.last_transition_at)
            >= self.config.cooldown.as_millis() as u64
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-transition; the state struct
        // holds only counters, so continuing with it is sound.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CircuitBreaker for RollingCircuitBreaker {
    fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn should_allow(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.cooldown_elapsed(&inner) {
                    inner.transition(CircuitState::HalfOpen);
                    // The transitioning request is the first probe.
                    inner.probes_used = 1;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.probes_used < self.config.half_open_max_probes {
                    inner.probes_used += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
                inner.push_outcome(true, self.config.window_size);
            }
            CircuitState::HalfOpen => {
                // Probe succeeded: close and start from a clean window.
                inner.transition(CircuitState::Closed);
                inner.window.clear();
                inner.consecutive_failures = 0;
                inner.probes_used = 0;
            }
            CircuitState::Open => {
                // A straggling attempt that started before the circuit
                // opened. The outcome is recorded but cannot close an open
                // circuit early.
                inner.push_outcome(true, self.config.window_size);
            }
        }
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        inner.last_failure_at = Some(Timestamp::now());
        inner.consecutive_failures += 1;
        match inner.state {
            CircuitState::Closed => {
                inner.push_outcome(false, self.config.window_size);
                if inner.window_failures() >= self.config.failure_threshold {
                    inner.transition(CircuitState::Open);
                    inner.times_opened += 1;
                }
            }
            CircuitState::HalfOpen => {
                // Probe failed: reopen and restart the cooldown.
                inner.push_outcome(false, self.config.window_size);
                inner.transition(CircuitState::Open);
                inner.times_opened += 1;
                inner.probes_used = 0;
            }
            CircuitState::Open => {
                inner.push_outcome(false, self.config.window_size);
            }
        }
    }

    fn reset(&self) {
        let mut inner = self.lock();
        tracing::info!("circuit breaker force reset");
        inner.state = CircuitState::Closed;
        inner.window.clear();
        inner.consecutive_failures = 0;
        inner.probes_used = 0;
        inner.last_transition_at = Timestamp::now();
    }

    fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            window_successes: inner.window_successes(),
            window_failures: inner.window_failures(),
            times_opened: inner.times_opened,
            last_transition_at: inner.last_transition_at,
            last_failure_at: inner.last_failure_at,
        }
    }
}
