//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
///
/// Misconfiguration is fatal at startup, never at request time.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Breaker failure threshold must be at least 1")]
    InvalidFailureThreshold,

    #[error("Breaker window size must be at least the failure threshold")]
    WindowSmallerThanThreshold,

    #[error("Breaker cooldown must be non-zero")]
    InvalidCooldown,

    #[error("Breaker must allow at least one half-open probe")]
    InvalidProbeCount,

    #[error("Cache TTL must be non-zero")]
    InvalidCacheTtl,

    #[error("Cache grace period must be at least the TTL")]
    GraceShorterThanTtl,

    #[error("Cache shard count must be between 1 and 256")]
    InvalidShardCount,

    #[error("Classifier timeout must be non-zero")]
    InvalidClassifierTimeout,

    #[error("Health check interval must be non-zero")]
    InvalidHealthInterval,
}
