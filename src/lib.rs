//! Persona Edge - Visitor Persona Classification Middleware
//!
//! This crate implements the reliability core of an edge personalization
//! layer: behavioral signal extraction, profile caching, circuit-breaker
//! state management, and fallback-strategy selection, so every request
//! receives a usable persona decision within bounded latency.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
