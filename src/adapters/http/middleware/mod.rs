//! HTTP middleware for axum.

mod persona;

pub use persona::{headers, persona_middleware};
