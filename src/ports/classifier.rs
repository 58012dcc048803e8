//! PersonaClassifier port - Interface for the external scoring collaborator.
//!
//! The concrete persona-scoring heuristics (weights mapping device, traffic
//! source, and time of day to a segment) live outside this crate. The
//! resolver only needs a fallible async call that either returns a decision
//! or fails; failures feed the circuit breaker and never reach the request
//! path.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::persona::PersonaDecision;
use crate::domain::signal::BehavioralSignal;

use super::profile_cache::CacheEntry;

/// Port for the external classification pipeline.
///
/// `prior` carries the visitor's existing cache entry, when one exists, so
/// an implementation can refine a previous decision incrementally instead
/// of scoring from scratch.
#[async_trait]
pub trait PersonaClassifier: Send + Sync {
    /// Classifies a visitor from their behavioral signal.
    ///
    /// May take arbitrarily long or fail; the caller bounds it with a
    /// timeout and treats deadline expiry identically to an error.
    async fn classify(
        &self,
        signal: &BehavioralSignal,
        prior: Option<&CacheEntry>,
    ) -> Result<PersonaDecision, ClassifierError>;
}

/// Errors from the classification collaborator.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// The pipeline is unreachable or refused the request.
    #[error("Classifier unavailable: {message}")]
    Unavailable { message: String },

    /// The pipeline did not answer within its own deadline.
    #[error("Classifier timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The pipeline answered with something unusable.
    #[error("Classifier returned malformed output: {message}")]
    Malformed { message: String },
}

impl ClassifierError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a malformed-output error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Whether the failure is transient.
    ///
    /// All classifier failures count against the breaker either way; this
    /// only affects log severity.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClassifierError::Unavailable { .. } | ClassifierError::Timeout { .. }
        )
    }
}
