//! Persona resolver - the fallback strategy selector.
//!
//! For each request the resolver consults the profile cache and the circuit
//! breaker, optionally invokes the external classifier under a deadline, and
//! always produces a usable decision. Classification failures are visible
//! only through breaker state and logs, never to the caller.
//!
//! Strategy selection, first match wins:
//!
//! 1. fresh cache entry -> `cached`, no classification, breaker untouched
//! 2. breaker allows -> classify under timeout; success caches and returns
//!    `fresh`; failure records on the breaker and falls through
//! 3. stale entry within grace -> `cached` (stale reuse)
//! 4. classification was attempted and failed -> `degraded`
//! 5. otherwise -> `default`

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::domain::persona::{DecisionSource, PersonaDecision};
use crate::domain::signal::{extract, Fingerprint, RequestSnapshot};
use crate::ports::{CircuitBreaker, PersonaClassifier, ProfileCache};

/// Which path produced the decision. Finer-grained than
/// [`DecisionSource`]: stale reuse is reported as `cached` in headers but
/// logged distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Live classification on this request.
    Fresh,
    /// Fresh-within-TTL cache hit.
    Cached,
    /// Stale-within-grace reuse while the pipeline is unavailable.
    Stale,
    /// Generic default, no classification attempted.
    Default,
    /// Classification attempted and failed with nothing to reuse.
    Degraded,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fresh => "fresh",
            Strategy::Cached => "cached",
            Strategy::Stale => "stale",
            Strategy::Default => "default",
            Strategy::Degraded => "degraded",
        }
    }
}

/// A resolved persona decision plus selection metadata.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub decision: PersonaDecision,
    pub strategy: Strategy,
    pub fingerprint: Fingerprint,
}

/// Orchestrator producing a persona decision for every request.
///
/// Explicitly injected dependencies, one instance per process; tests
/// construct isolated instances with their own cache and breaker.
pub struct PersonaResolver {
    cache: Arc<dyn ProfileCache>,
    breaker: Arc<dyn CircuitBreaker>,
    classifier: Arc<dyn PersonaClassifier>,
    classify_timeout: Duration,
}

impl PersonaResolver {
    /// Creates a resolver over the given collaborators.
    pub fn new(
        cache: Arc<dyn ProfileCache>,
        breaker: Arc<dyn CircuitBreaker>,
        classifier: Arc<dyn PersonaClassifier>,
        classify_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            breaker,
            classifier,
            classify_timeout,
        }
    }

    /// Resolves a persona decision for the request. Never fails.
    pub async fn resolve(&self, snapshot: &RequestSnapshot) -> Resolution {
        let fingerprint = Fingerprint::from_snapshot(snapshot);

        // Rule 1: fresh cache hit short-circuits everything.
        if let Some(entry) = self.cache.get(&fingerprint).await {
            return Resolution {
                decision: entry.decision.with_source(DecisionSource::Cached),
                strategy: Strategy::Cached,
                fingerprint,
            };
        }

        // Rule 2: attempt live classification if the breaker allows it.
        let mut attempted = false;
        if self.breaker.should_allow() {
            attempted = true;
            if let Some(decision) = self.classify_bounded(snapshot, &fingerprint).await {
                return Resolution {
                    decision,
                    strategy: Strategy::Fresh,
                    fingerprint,
                };
            }
        }

        // Rule 3: stale reuse beats the generic default during an outage.
        if let Some(entry) = self.cache.get_stale(&fingerprint).await {
            tracing::debug!(
                fingerprint = %fingerprint,
                age_ms = entry.age_ms(crate::domain::foundation::Timestamp::now()),
                "serving stale persona during classification outage"
            );
            return Resolution {
                decision: entry.decision.with_source(DecisionSource::Cached),
                strategy: Strategy::Stale,
                fingerprint,
            };
        }

        // Rules 4/5: nothing usable - default, tagged degraded if we tried.
        if attempted {
            Resolution {
                decision: PersonaDecision::degraded(),
                strategy: Strategy::Degraded,
                fingerprint,
            }
        } else {
            Resolution {
                decision: PersonaDecision::default_visitor(),
                strategy: Strategy::Default,
                fingerprint,
            }
        }
    }

    /// Runs the classifier under the configured deadline.
    ///
    /// Success records on the breaker and writes the cache; failure and
    /// timeout record a breaker failure and return `None`. The cache write
    /// happens only after a confirmed success, so a failed classification
    /// never overwrites a good stale entry. If the surrounding request
    /// future is dropped mid-flight, neither success nor failure is
    /// recorded for the abandoned attempt.
    async fn classify_bounded(
        &self,
        snapshot: &RequestSnapshot,
        fingerprint: &Fingerprint,
    ) -> Option<PersonaDecision> {
        let signal = extract(snapshot);
        let prior = self.cache.get_stale(fingerprint).await;

        match timeout(
            self.classify_timeout,
            self.classifier.classify(&signal, prior.as_ref()),
        )
        .await
        {
            Ok(Ok(decision)) => {
                self.breaker.record_success();
                let decision = decision.with_source(DecisionSource::Fresh);
                self.cache.put(fingerprint.clone(), decision).await;
                Some(decision)
            }
            Ok(Err(error)) => {
                self.breaker.record_failure();
                tracing::warn!(
                    fingerprint = %fingerprint,
                    error = %error,
                    "classification failed"
                );
                None
            }
            Err(_) => {
                self.breaker.record_failure();
                tracing::warn!(
                    fingerprint = %fingerprint,
                    timeout_ms = self.classify_timeout.as_millis() as u64,
                    "classification timed out"
                );
                None
            }
        }
    }
}
