//! Classifier adapters.
//!
//! The real scoring pipeline lives outside this crate; the mock is used by
//! tests and development wiring.

mod mock;

pub use mock::{MockClassifier, MockOutcome};
