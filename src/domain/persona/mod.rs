//! Persona module - Visitor segment labels and classification decisions.
//!
//! A persona is one label from a closed set describing a visitor's inferred
//! behavioral segment. Downstream renderers use it to select content
//! variants; nothing here identifies a real user.

mod decision;
mod label;

pub use decision::{Confidence, DecisionSource, PersonaDecision};
pub use label::Persona;
