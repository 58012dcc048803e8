//! Persona classification middleware for axum.
//!
//! Intercepts every content request, resolves a persona decision, and
//! attaches it to the response so downstream renderers (banner and
//! recommendation slots) can personalize:
//!
//! - `x-user-persona`: persona label from the closed set
//! - `x-persona-source`: `fresh|cached|default|degraded|unknown`
//! - `x-persona-confidence`: decimal in [0, 1]
//!
//! The resolved decision is also inserted into request extensions for
//! in-process handlers. Visitors without a `pe_vid` cookie get one minted,
//! so their later requests share a fingerprint.
//!
//! The middleware never fails a request: worst case a visitor receives
//! generic content with the default persona headers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::application::Resolution;
use crate::domain::foundation::Timestamp;
use crate::domain::signal::{RequestSnapshot, VISITOR_COOKIE};

use super::super::AppState;

/// Persona header names.
pub mod headers {
    use super::HeaderName;

    /// Persona label for downstream renderers.
    pub static X_USER_PERSONA: HeaderName = HeaderName::from_static("x-user-persona");
    /// Which strategy produced the decision.
    pub static X_PERSONA_SOURCE: HeaderName = HeaderName::from_static("x-persona-source");
    /// Decision confidence in [0, 1].
    pub static X_PERSONA_CONFIDENCE: HeaderName = HeaderName::from_static("x-persona-confidence");
}

/// Persona classification middleware.
///
/// 1. Snapshots the request (path, query, UA, referrer, cookies, IP)
/// 2. Mints a visitor id cookie when none is present
/// 3. Resolves a decision through cache, breaker, and classifier
/// 4. Exposes the decision via request extension and response headers
/// 5. Opportunistically samples pipeline health on the throttle
pub async fn persona_middleware(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut snapshot = snapshot_request(&request, connect_info.as_ref());

    // Mint a visitor id for cookieless visitors so the fingerprint holds
    // across their session. The minted id goes into the snapshot now and
    // onto the response as Set-Cookie below.
    let minted_id = if has_visitor_cookie(snapshot.cookies.as_deref()) {
        None
    } else {
        let id = Uuid::new_v4().to_string();
        let pair = format!("{VISITOR_COOKIE}={id}");
        snapshot.cookies = Some(match snapshot.cookies.take() {
            Some(existing) => format!("{existing}; {pair}"),
            None => pair,
        });
        Some(id)
    };

    let resolution = state.resolver.resolve(&snapshot).await;
    tracing::debug!(
        strategy = resolution.strategy.as_str(),
        persona = resolution.decision.persona.as_str(),
        path = %snapshot.path,
        "persona resolved"
    );

    // Health sampling rides on request volume but is interval-throttled.
    if state.monitor.should_check() {
        let report = state
            .monitor
            .generate_report(&state.breaker.snapshot(), &state.cache.stats().await);
        state.monitor.log_report(&report);
    }

    request.extensions_mut().insert(resolution.clone());
    let mut response = next.run(request).await;

    apply_persona_headers(&mut response, &resolution);
    if let Some(id) = minted_id {
        set_visitor_cookie(&mut response, &id);
    }

    response
}

/// Builds a framework-independent snapshot of the request.
fn snapshot_request<B>(
    request: &axum::http::Request<B>,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> RequestSnapshot {
    let header_str = |name: header::HeaderName| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RequestSnapshot {
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        // Browsers never send the fragment; only present on synthetic requests.
        fragment: None,
        user_agent: header_str(header::USER_AGENT),
        referrer: header_str(header::REFERER),
        cookies: header_str(header::COOKIE),
        client_ip: extract_client_ip(request, connect_info),
        received_at: Timestamp::now(),
    }
}

/// Extract client IP from request, checking forwarded headers first.
///
/// Order of precedence:
/// 1. X-Forwarded-For header (first IP in list)
/// 2. X-Real-IP header
/// 3. ConnectInfo socket address
fn extract_client_ip<B>(
    request: &axum::http::Request<B>,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    if let Some(forwarded) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded.split(',').next() {
            return Some(first_ip.trim().to_string());
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
    {
        return Some(real_ip.to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

fn has_visitor_cookie(cookies: Option<&str>) -> bool {
    cookies
        .map(|header| {
            header
                .split(';')
                .any(|pair| pair.split_once('=').map(|(k, _)| k.trim()) == Some(VISITOR_COOKIE))
        })
        .unwrap_or(false)
}

/// Writes the three persona headers onto the response.
fn apply_persona_headers(response: &mut Response, resolution: &Resolution) {
    let headers_mut = response.headers_mut();
    headers_mut.insert(
        headers::X_USER_PERSONA.clone(),
        HeaderValue::from_static(resolution.decision.persona.as_str()),
    );
    headers_mut.insert(
        headers::X_PERSONA_SOURCE.clone(),
        HeaderValue::from_static(resolution.decision.source.as_str()),
    );
    if let Ok(confidence) = HeaderValue::from_str(&resolution.decision.confidence.as_header_value())
    {
        headers_mut.insert(headers::X_PERSONA_CONFIDENCE.clone(), confidence);
    }
}

fn set_visitor_cookie(response: &mut Response, visitor_id: &str) {
    let cookie = format!("{VISITOR_COOKIE}={visitor_id}; Path=/; Max-Age=31536000; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
