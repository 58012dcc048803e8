//! Application layer - Orchestration over the ports.
//!
//! - `resolver` - Fallback strategy selection for persona decisions
//! - `health` - Throttled health reporting over breaker and cache metrics

pub mod health;
pub mod resolver;

pub use health::{HealthConfig, HealthMonitor, HealthReport};
pub use resolver::{PersonaResolver, Resolution, Strategy};
