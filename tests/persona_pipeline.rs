//! End-to-end tests for the persona middleware pipeline.
//!
//! Drives the real router (middleware + health endpoint) through
//! `tower::ServiceExt::oneshot` with an in-memory cache, a real breaker,
//! and a scripted classifier.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use persona_edge::adapters::cache::ShardedProfileCache;
use persona_edge::adapters::classifier::MockClassifier;
use persona_edge::adapters::http::{router, AppState};
use persona_edge::adapters::resilience::RollingCircuitBreaker;
use persona_edge::application::{HealthConfig, HealthMonitor, PersonaResolver};
use persona_edge::domain::foundation::Timestamp;
use persona_edge::domain::persona::{Confidence, DecisionSource, Persona, PersonaDecision};
use persona_edge::domain::signal::Fingerprint;
use persona_edge::ports::{
    BreakerConfig, CacheConfig, CacheEntry, CircuitBreaker, CircuitState, ProfileCache,
};

const TTL_MS: u64 = 5 * 60 * 1000;
const GRACE_MS: u64 = 30 * 60 * 1000;

struct Harness {
    app: axum::Router,
    cache: Arc<ShardedProfileCache>,
    breaker: Arc<RollingCircuitBreaker>,
}

fn harness(classifier: MockClassifier) -> Harness {
    let cache = Arc::new(ShardedProfileCache::new(CacheConfig {
        ttl_ms: TTL_MS,
        grace_ms: GRACE_MS,
        shards: 8,
    }));
    let breaker = Arc::new(RollingCircuitBreaker::new(BreakerConfig {
        failure_threshold: 3,
        window_size: 10,
        cooldown: Duration::from_secs(30),
        half_open_max_probes: 1,
    }));
    let resolver = Arc::new(PersonaResolver::new(
        cache.clone(),
        breaker.clone(),
        Arc::new(classifier),
        Duration::from_millis(100),
    ));
    let monitor = Arc::new(HealthMonitor::new(HealthConfig::default()));

    let state = Arc::new(AppState {
        resolver,
        breaker: breaker.clone(),
        cache: cache.clone(),
        monitor,
    });

    Harness {
        app: router(state),
        cache,
        breaker,
    }
}

fn request(visitor: &str) -> Request<Body> {
    Request::builder()
        .uri("/")
        .header("Cookie", format!("pe_vid={visitor}"))
        .header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)")
        .body(Body::empty())
        .unwrap()
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

fn trip_breaker(breaker: &RollingCircuitBreaker) {
    for _ in 0..3 {
        breaker.record_failure();
    }
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[tokio::test]
async fn fresh_classification_sets_headers_and_populates_cache() {
    let h = harness(MockClassifier::new().with_decision(Persona::HealthConscious, 0.82));

    let response = h.app.clone().oneshot(request("v1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-user-persona"), "health_conscious");
    assert_eq!(header(&response, "x-persona-source"), "fresh");
    assert_eq!(header(&response, "x-persona-confidence"), "0.82");

    let entry = h.cache.get(&Fingerprint::from_visitor_id("v1")).await;
    assert_eq!(entry.unwrap().decision.persona, Persona::HealthConscious);
}

#[tokio::test]
async fn second_request_within_ttl_is_served_from_cache() {
    let h = harness(MockClassifier::new().with_decision(Persona::Researcher, 0.7));

    let first = h.app.clone().oneshot(request("v1")).await.unwrap();
    assert_eq!(header(&first, "x-persona-source"), "fresh");

    let second = h.app.clone().oneshot(request("v1")).await.unwrap();
    assert_eq!(header(&second, "x-user-persona"), "researcher");
    assert_eq!(header(&second, "x-persona-source"), "cached");
    assert_eq!(header(&second, "x-persona-confidence"), "0.70");
}

#[tokio::test]
async fn cookieless_visitor_receives_minted_cookie() {
    let h = harness(MockClassifier::new().with_decision(Persona::WindowShopper, 0.4));

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header("User-Agent", "Mozilla/5.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let cookie = header(&response, "set-cookie");
    assert!(cookie.starts_with("pe_vid="), "unexpected cookie: {cookie}");
    // A returning visitor with a cookie keeps it.
    let with_cookie = h.app.clone().oneshot(request("v1")).await.unwrap();
    assert!(with_cookie.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn open_breaker_reuses_stale_entry_as_cached() {
    let h = harness(MockClassifier::new());
    trip_breaker(&h.breaker);

    // 10-minute-old entry: expired for TTL (5 min), inside grace (30 min).
    h.cache
        .insert_entry(
            Fingerprint::from_visitor_id("v1"),
            CacheEntry::new(
                PersonaDecision::new(
                    Persona::PremiumSeeker,
                    Confidence::new(0.6),
                    DecisionSource::Fresh,
                ),
                Timestamp::now().minus_millis(10 * 60 * 1000),
            ),
        )
        .await;

    let response = h.app.clone().oneshot(request("v1")).await.unwrap();

    assert_eq!(header(&response, "x-user-persona"), "premium_seeker");
    assert_eq!(header(&response, "x-persona-source"), "cached");
}

#[tokio::test]
async fn open_breaker_with_empty_cache_serves_default() {
    let h = harness(MockClassifier::new());
    trip_breaker(&h.breaker);

    let response = h.app.clone().oneshot(request("v1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-user-persona"), "new_visitor");
    assert_eq!(header(&response, "x-persona-source"), "default");
    assert_eq!(header(&response, "x-persona-confidence"), "0.00");
}

#[tokio::test]
async fn classification_timeout_degrades_without_failing_the_request() {
    let h = harness(
        MockClassifier::new()
            .with_decision(Persona::Researcher, 0.9)
            .with_delay(Duration::from_secs(5)),
    );

    let response = h.app.clone().oneshot(request("v1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-user-persona"), "new_visitor");
    assert_eq!(header(&response, "x-persona-source"), "degraded");
    assert_eq!(h.breaker.snapshot().window_failures, 1);
}

#[tokio::test]
async fn repeated_failures_open_breaker_and_stop_classification_calls() {
    let h = harness(MockClassifier::new().with_failures(3));

    for i in 0..3 {
        let response = h
            .app
            .clone()
            .oneshot(request(&format!("v{i}")))
            .await
            .unwrap();
        assert_eq!(header(&response, "x-persona-source"), "degraded");
    }
    assert_eq!(h.breaker.state(), CircuitState::Open);

    // Breaker now gates; an unseen visitor gets the default immediately.
    let response = h.app.clone().oneshot(request("unseen")).await.unwrap();
    assert_eq!(header(&response, "x-persona-source"), "default");
}

#[tokio::test]
async fn healthz_reports_closed_breaker_as_healthy() {
    let h = harness(MockClassifier::new());

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["healthy"], true);
    assert_eq!(json["circuit_state"], "closed");
}

#[tokio::test]
async fn healthz_reports_open_breaker_as_unhealthy() {
    let h = harness(MockClassifier::new());
    trip_breaker(&h.breaker);

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["healthy"], false);
    assert_eq!(json["circuit_state"], "open");
    // Health probes never touch persona headers.
}

#[tokio::test]
async fn healthz_bypasses_persona_middleware() {
    let h = harness(MockClassifier::new());
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().get("x-user-persona").is_none());
}
