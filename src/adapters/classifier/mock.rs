//! Mock classifier for testing and development wiring.
//!
//! Configurable to return specific decisions, simulate delays, or inject
//! errors, so resolver and middleware tests run without a real scoring
//! pipeline.
//!
//! # Example
//!
//! ```ignore
//! let classifier = MockClassifier::new()
//!     .with_decision(Persona::HealthConscious, 0.82)
//!     .with_delay(Duration::from_millis(50));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::persona::{Confidence, DecisionSource, Persona, PersonaDecision};
use crate::domain::signal::BehavioralSignal;
use crate::ports::{CacheEntry, ClassifierError, PersonaClassifier};

/// A scripted classification outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this decision.
    Decision(PersonaDecision),
    /// Fail with this error.
    Error(ClassifierError),
}

/// Mock classifier with scripted outcomes, consumed in order.
///
/// When the script is exhausted (or empty), every call returns the last
/// configured fallback decision, defaulting to `new_visitor`.
#[derive(Debug)]
pub struct MockClassifier {
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: PersonaDecision,
    delay: Duration,
    calls: AtomicUsize,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// Creates a mock that answers `new_visitor` forever.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: PersonaDecision::new(
                Persona::NewVisitor,
                Confidence::ZERO,
                DecisionSource::Fresh,
            ),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queues a successful decision.
    pub fn with_decision(self, persona: Persona, confidence: f64) -> Self {
        self.push(MockOutcome::Decision(PersonaDecision::new(
            persona,
            Confidence::new(confidence),
            DecisionSource::Fresh,
        )))
    }

    /// Queues an error outcome.
    pub fn with_error(self, error: ClassifierError) -> Self {
        self.push(MockOutcome::Error(error))
    }

    /// Queues `count` unavailable errors.
    pub fn with_failures(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.with_error(ClassifierError::unavailable("scripted failure"));
        }
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the decision returned once the script is exhausted.
    pub fn with_fallback(mut self, persona: Persona, confidence: f64) -> Self {
        self.fallback =
            PersonaDecision::new(persona, Confidence::new(confidence), DecisionSource::Fresh);
        self
    }

    fn push(self, outcome: MockOutcome) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
        self
    }

    /// Number of classify calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonaClassifier for MockClassifier {
    async fn classify(
        &self,
        _signal: &BehavioralSignal,
        _prior: Option<&CacheEntry>,
    ) -> Result<PersonaDecision, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let outcome = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match outcome {
            Some(MockOutcome::Decision(decision)) => Ok(decision),
            Some(MockOutcome::Error(error)) => Err(error),
            None => Ok(self.fallback),
        }
    }
}
