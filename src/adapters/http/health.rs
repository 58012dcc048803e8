//! Health endpoint - JSON health report for operators and probes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::AppState;

/// `GET /healthz` - current pipeline health.
///
/// Returns 200 while the breaker is closed or probing, 503 while open.
/// Generating a report on demand is cheap (two snapshots), so this endpoint
/// is not throttled; the throttle only gates request-path sampling.
pub async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    let report = state
        .monitor
        .generate_report(&state.breaker.snapshot(), &state.cache.stats().await);

    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report)).into_response()
}
