//! Persona Edge server binary.
//!
//! Loads configuration, constructs one cache/breaker/resolver per process,
//! and serves the middleware-wrapped router. The classifier wired here is
//! the development mock; deployments plug their scoring service in behind
//! the `PersonaClassifier` port.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use persona_edge::adapters::cache::ShardedProfileCache;
use persona_edge::adapters::classifier::MockClassifier;
use persona_edge::adapters::http::{router, AppState};
use persona_edge::adapters::resilience::RollingCircuitBreaker;
use persona_edge::application::{HealthMonitor, PersonaResolver};
use persona_edge::config::AppConfig;
use persona_edge::domain::persona::Persona;
use persona_edge::ports::{CircuitBreaker, ProfileCache};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            std::process::exit(1);
        }
    };
    // Misconfigured thresholds are fatal here, never at request time.
    if let Err(error) = config.validate() {
        eprintln!("invalid configuration: {error}");
        std::process::exit(1);
    }

    init_tracing(&config);

    let cache: Arc<ShardedProfileCache> =
        Arc::new(ShardedProfileCache::new(config.cache.to_cache_config()));
    let breaker: Arc<dyn CircuitBreaker> =
        Arc::new(RollingCircuitBreaker::new(config.breaker.to_breaker_config()));
    let classifier = Arc::new(MockClassifier::new().with_fallback(Persona::WindowShopper, 0.5));
    let monitor = Arc::new(HealthMonitor::new(config.health.to_health_config()));

    let resolver = Arc::new(PersonaResolver::new(
        cache.clone(),
        breaker.clone(),
        classifier,
        config.classifier.timeout(),
    ));

    let state = Arc::new(AppState {
        resolver,
        breaker,
        cache: cache.clone(),
        monitor,
    });

    spawn_cache_sweeper(cache, config.cache.ttl_ms);

    let addr = match config.server.socket_addr() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!(%error, host = %config.server.host, "invalid bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "persona-edge listening");

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server exited");
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Periodic sweep keeping cache memory bounded under high unique-visitor
/// volume. Lazy expiry on read keeps correctness even if this task stalls.
fn spawn_cache_sweeper(cache: Arc<ShardedProfileCache>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_millis(interval_ms.max(1000)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let evicted = cache.evict_expired().await;
            if evicted > 0 {
                tracing::debug!(evicted, "swept expired profile entries");
            }
        }
    });
}
