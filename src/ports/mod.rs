//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PersonaClassifier` - The external scoring collaborator
//! - `ProfileCache` - TTL-bounded store of recent persona decisions
//! - `CircuitBreaker` - Classification pipeline resilience pattern

mod circuit_breaker;
mod classifier;
mod profile_cache;

pub use circuit_breaker::{BreakerConfig, BreakerSnapshot, CircuitBreaker, CircuitState};
pub use classifier::{ClassifierError, PersonaClassifier};
pub use profile_cache::{CacheConfig, CacheEntry, CacheStats, ProfileCache};
