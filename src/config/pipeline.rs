//! Persona pipeline configuration - cache, breaker, classifier, health.
//!
//! Every reliability tunable is an explicit configuration input with a
//! development default; none is hardcoded in the components.

use serde::Deserialize;
use std::time::Duration;

use crate::application::HealthConfig;
use crate::ports::{BreakerConfig, CacheConfig};

use super::error::ValidationError;

/// Profile cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Entry freshness bound in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,

    /// Stale-usability bound in milliseconds; must be >= `ttl_ms`.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Number of cache shards.
    #[serde(default = "default_shards")]
    pub shards: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: default_cache_ttl_ms(),
            grace_ms: default_grace_ms(),
            shards: default_shards(),
        }
    }
}

impl CacheSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_ms == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }
        if self.grace_ms < self.ttl_ms {
            return Err(ValidationError::GraceShorterThanTtl);
        }
        if self.shards == 0 || self.shards > 256 {
            return Err(ValidationError::InvalidShardCount);
        }
        Ok(())
    }

    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl_ms: self.ttl_ms,
            grace_ms: self.grace_ms,
            shards: self.shards,
        }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerSettings {
    /// Failures within the rolling window that open the circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Rolling outcome window size, in attempts.
    #[serde(default = "default_window_size")]
    pub window_size: u32,

    /// Open-state cooldown before a recovery probe, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Probe attempts allowed while half-open.
    #[serde(default = "default_half_open_max_probes")]
    pub half_open_max_probes: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            window_size: default_window_size(),
            cooldown_ms: default_cooldown_ms(),
            half_open_max_probes: default_half_open_max_probes(),
        }
    }
}

impl BreakerSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.failure_threshold == 0 {
            return Err(ValidationError::InvalidFailureThreshold);
        }
        if self.window_size < self.failure_threshold {
            return Err(ValidationError::WindowSmallerThanThreshold);
        }
        if self.cooldown_ms == 0 {
            return Err(ValidationError::InvalidCooldown);
        }
        if self.half_open_max_probes == 0 {
            return Err(ValidationError::InvalidProbeCount);
        }
        Ok(())
    }

    pub fn to_breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.failure_threshold,
            window_size: self.window_size,
            cooldown: Duration::from_millis(self.cooldown_ms),
            half_open_max_probes: self.half_open_max_probes,
        }
    }
}

/// Classifier invocation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    /// Upper bound on a classification attempt, in milliseconds.
    /// Expiry counts as a failure for breaker purposes.
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

impl ClassifierSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidClassifierTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Health monitor settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthSettings {
    /// Minimum interval between active health checks, in milliseconds.
    #[serde(default = "default_health_interval_ms")]
    pub check_interval_ms: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            check_interval_ms: default_health_interval_ms(),
        }
    }
}

impl HealthSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.check_interval_ms == 0 {
            return Err(ValidationError::InvalidHealthInterval);
        }
        Ok(())
    }

    pub fn to_health_config(&self) -> HealthConfig {
        HealthConfig {
            check_interval: Duration::from_millis(self.check_interval_ms),
        }
    }
}

fn default_cache_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_grace_ms() -> u64 {
    30 * 60 * 1000
}

fn default_shards() -> usize {
    16
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_window_size() -> u32 {
    20
}

fn default_cooldown_ms() -> u64 {
    30_000
}

fn default_half_open_max_probes() -> u32 {
    1
}

fn default_classifier_timeout_ms() -> u64 {
    400
}

fn default_health_interval_ms() -> u64 {
    30_000
}
