//! HTTP adapters - axum wiring for the persona pipeline.
//!
//! The hosting framework owns the actual content routes; this module
//! provides the interception middleware, the health endpoint, and the
//! shared state they read.

pub mod health;
pub mod middleware;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::application::{HealthMonitor, PersonaResolver};
use crate::ports::{CircuitBreaker, ProfileCache};

/// Process-wide state shared across request handlers.
///
/// Constructed once at startup and injected explicitly - no ambient
/// singletons, so tests build isolated instances per case.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PersonaResolver>,
    pub breaker: Arc<dyn CircuitBreaker>,
    pub cache: Arc<dyn ProfileCache>,
    pub monitor: Arc<HealthMonitor>,
}

/// Builds the service router.
///
/// Content routes go through the persona middleware; `/healthz` bypasses it
/// so health probes never consume classification budget.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::persona_middleware,
        ))
        .route("/healthz", get(health::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Placeholder content route; real deployments mount their own renderers
/// behind the middleware.
async fn index() -> &'static str {
    "persona-edge"
}
