//! Domain layer containing pure types and pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared value objects (timestamps)
//! - `persona` - Persona labels, confidence, and decisions
//! - `signal` - Behavioral signals, extraction, and fingerprints
//!
//! Nothing in this layer performs I/O or holds shared mutable state.

pub mod foundation;
pub mod persona;
pub mod signal;
