//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `PERSONA_EDGE` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use persona_edge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod pipeline;
mod server;

pub use error::{ConfigError, ValidationError};
pub use pipeline::{BreakerSettings, CacheSettings, ClassifierSettings, HealthSettings};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Profile cache configuration (TTL, grace, shards)
    #[serde(default)]
    pub cache: CacheSettings,

    /// Circuit breaker configuration (threshold, window, cooldown)
    #[serde(default)]
    pub breaker: BreakerSettings,

    /// Classifier invocation configuration (timeout)
    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Health monitor configuration (check interval)
    #[serde(default)]
    pub health: HealthSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `PERSONA_EDGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `PERSONA_EDGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PERSONA_EDGE__BREAKER__FAILURE_THRESHOLD=5`
    /// - `PERSONA_EDGE__CACHE__TTL_MS=300000`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERSONA_EDGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Misconfiguration (zero thresholds, grace shorter than TTL) is fatal
    /// here, at startup, so the request path never sees invalid tunables.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.cache.validate()?;
        self.breaker.validate()?;
        self.classifier.validate()?;
        self.health.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PERSONA_EDGE__") {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn load_with_no_env_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.breaker.failure_threshold, 5);
        assert_eq!(config.cache.ttl_ms, 5 * 60 * 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("PERSONA_EDGE__SERVER__PORT", "9090");
        env::set_var("PERSONA_EDGE__BREAKER__FAILURE_THRESHOLD", "3");
        env::set_var("PERSONA_EDGE__CACHE__GRACE_MS", "1800000");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.breaker.failure_threshold, 3);
        assert_eq!(config.cache.grace_ms, 1_800_000);

        clear_env();
    }

    #[test]
    fn validate_rejects_degenerate_breaker() {
        let mut config = AppConfig::default();
        config.breaker.failure_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_grace_below_ttl() {
        let mut config = AppConfig::default();
        config.cache.ttl_ms = 60_000;
        config.cache.grace_ms = 30_000;
        assert!(config.validate().is_err());
    }
}
