//! Persona decision - the output unit of the classification pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Persona;

/// Confidence score in [0, 1].
///
/// Construction clamps out-of-range values, so a confidence is always
/// defined and always valid - classifier output is not trusted to stay in
/// range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Zero confidence, used by the default and degraded strategies.
    pub const ZERO: Confidence = Confidence(0.0);

    /// Creates a confidence, clamping into [0, 1]. NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Raw score.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Header representation, e.g. "0.82".
    pub fn as_header_value(&self) -> String {
        // Two decimals is enough resolution for renderers and keeps the
        // header stable across float formatting quirks.
        format!("{:.2}", self.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Which strategy produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Live classification succeeded on this request.
    Fresh,
    /// Served from the profile cache (fresh-within-TTL or stale-within-grace).
    Cached,
    /// Generic default; no classification attempted.
    Default,
    /// Classification was attempted and failed with nothing cached to reuse.
    Degraded,
    /// Provenance could not be determined (never produced by the resolver,
    /// kept for parsing foreign header values).
    Unknown,
}

impl DecisionSource {
    /// Wire representation used in the `x-persona-source` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionSource::Fresh => "fresh",
            DecisionSource::Cached => "cached",
            DecisionSource::Default => "default",
            DecisionSource::Degraded => "degraded",
            DecisionSource::Unknown => "unknown",
        }
    }

    /// Maps an incoming string to a source, defaulting to `Unknown`.
    pub fn parse(value: &str) -> DecisionSource {
        match value {
            "fresh" => DecisionSource::Fresh,
            "cached" => DecisionSource::Cached,
            "default" => DecisionSource::Default,
            "degraded" => DecisionSource::Degraded,
            _ => DecisionSource::Unknown,
        }
    }
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persona decision: label, confidence, and provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaDecision {
    /// The inferred segment.
    pub persona: Persona,
    /// How certain the classifier was, in [0, 1].
    pub confidence: Confidence,
    /// Which strategy produced this decision.
    pub source: DecisionSource,
}

impl PersonaDecision {
    /// Creates a decision with explicit provenance.
    pub fn new(persona: Persona, confidence: Confidence, source: DecisionSource) -> Self {
        Self {
            persona,
            confidence,
            source,
        }
    }

    /// The generic default decision: `new_visitor` with zero confidence.
    pub fn default_visitor() -> Self {
        Self::new(Persona::NewVisitor, Confidence::ZERO, DecisionSource::Default)
    }

    /// The degraded decision: the default persona tagged as degraded, used
    /// when classification failed and nothing cached was usable.
    pub fn degraded() -> Self {
        Self::new(Persona::NewVisitor, Confidence::ZERO, DecisionSource::Degraded)
    }

    /// Returns a copy of this decision re-tagged with another provenance.
    ///
    /// Cache replays use this so a stored `fresh` decision is reported as
    /// `cached` on later requests.
    pub fn with_source(mut self, source: DecisionSource) -> Self {
        self.source = source;
        self
    }
}
