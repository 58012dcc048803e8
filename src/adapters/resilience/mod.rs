//! Resilience adapters.

mod rolling_breaker;

pub use rolling_breaker::RollingCircuitBreaker;
