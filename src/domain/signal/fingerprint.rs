//! Visitor fingerprint - best-effort cache key, not an identity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::extractor::RequestSnapshot;

/// Cookie carrying the minted visitor id.
pub const VISITOR_COOKIE: &str = "pe_vid";

/// Best-effort key correlating a visitor's requests for caching purposes.
///
/// Derived from the visitor cookie when present, otherwise from IP plus
/// user-agent. Collisions are acceptable - the worst outcome is a visitor
/// briefly seeing another segment's content variant, never an auth or data
/// exposure issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derives a fingerprint from a request snapshot.
    ///
    /// Total: a snapshot with no cookie, IP, or user-agent still yields a
    /// (shared) fingerprint rather than an error.
    pub fn from_snapshot(snapshot: &RequestSnapshot) -> Self {
        if let Some(visitor_id) = snapshot
            .cookies
            .as_deref()
            .and_then(|c| cookie_value(c, VISITOR_COOKIE))
        {
            return Self::digest("vid", visitor_id);
        }

        let ip = snapshot.client_ip.as_deref().unwrap_or("");
        let ua = snapshot.user_agent.as_deref().unwrap_or("");
        Self::digest("ua", &format!("{ip}|{ua}"))
    }

    /// Builds a fingerprint directly from a visitor id (tests, replay).
    pub fn from_visitor_id(visitor_id: &str) -> Self {
        Self::digest("vid", visitor_id)
    }

    fn digest(namespace: &str, value: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b":");
        hasher.update(value.as_bytes());
        let hash = hasher.finalize();
        Self(format!("{hash:x}"))
    }

    /// Hex digest string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable shard index in `[0, shards)` derived from the digest prefix.
    ///
    /// `shards` must be non-zero; config validation enforces this.
    pub fn shard(&self, shards: usize) -> usize {
        // First 8 hex chars are 32 well-mixed bits, plenty for shard choice.
        let prefix = u32::from_str_radix(&self.0[..8], 16).unwrap_or(0);
        prefix as usize % shards
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds a cookie value in a raw Cookie header.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim())
        } else {
            None
        }
    })
}
