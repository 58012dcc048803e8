//! Adapters - Implementations of port interfaces.
//!
//! - `cache` - Sharded in-memory profile cache
//! - `classifier` - Mock classifier for tests and development wiring
//! - `http` - Axum middleware and health endpoint
//! - `resilience` - Rolling-window circuit breaker

pub mod cache;
pub mod classifier;
pub mod http;
pub mod resilience;
