//! ProfileCache port - TTL-bounded store of recent persona decisions.
//!
//! One entry per visitor fingerprint, replaced whole on write. An entry is
//! *fresh* while younger than the TTL, *stale* between TTL and the grace
//! bound, and unusable past grace. The stale band exists so an outage
//! degrades to slightly old personalization instead of the generic default.

use async_trait::async_trait;

use crate::domain::foundation::Timestamp;
use crate::domain::persona::PersonaDecision;
use crate::domain::signal::Fingerprint;

/// Cache tuning parameters.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age below which an entry is fresh and served without classification.
    pub ttl_ms: u64,
    /// Age below which a stale entry may still be served as a fallback.
    /// Must be >= `ttl_ms`; config validation enforces this.
    pub grace_ms: u64,
    /// Number of independent shards. More shards, less lock contention.
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 5 * 60 * 1000,
            grace_ms: 30 * 60 * 1000,
            shards: 16,
        }
    }
}

/// A cached decision plus its creation time.
///
/// Immutable once written - an update replaces the whole entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    pub decision: PersonaDecision,
    pub created_at: Timestamp,
}

impl CacheEntry {
    /// Creates an entry stamped with the given time.
    pub fn new(decision: PersonaDecision, created_at: Timestamp) -> Self {
        Self {
            decision,
            created_at,
        }
    }

    /// Entry age in milliseconds at `now`.
    pub fn age_ms(&self, now: Timestamp) -> u64 {
        now.millis_since(&self.created_at)
    }

    /// Whether the entry is still fresh at `now`.
    pub fn is_fresh(&self, now: Timestamp, ttl_ms: u64) -> bool {
        self.age_ms(now) < ttl_ms
    }

    /// Whether the entry is still usable as a stale fallback at `now`.
    pub fn within_grace(&self, now: Timestamp, grace_ms: u64) -> bool {
        self.age_ms(now) < grace_ms
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Fresh-hit reads since process start.
    pub hits: u64,
    /// Reads that found nothing fresh since process start.
    pub misses: u64,
    /// Entries currently stored (including stale ones not yet swept).
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate over all reads, 0.0 when nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// Port for the per-process profile cache.
///
/// Implementations must be safe under concurrent access from many request
/// handlers: readers never observe a partially written entry, and unrelated
/// fingerprints must not serialize on a single global lock.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Returns the entry for `fingerprint` if one exists and is fresh.
    ///
    /// Entries older than the TTL are treated as absent here. Counts as a
    /// hit or miss in [`stats`](ProfileCache::stats).
    async fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry>;

    /// Returns the entry even past TTL, as long as it is within the grace
    /// bound. Beyond grace the entry is unusable and `None` is returned.
    ///
    /// Fallback-only read; does not count toward hit/miss stats.
    async fn get_stale(&self, fingerprint: &Fingerprint) -> Option<CacheEntry>;

    /// Stores a decision for `fingerprint`, replacing any existing entry
    /// with a new one stamped with the current time.
    async fn put(&self, fingerprint: Fingerprint, decision: PersonaDecision);

    /// Removes entries older than the grace bound. Returns how many were
    /// evicted. Optional sweep; lazy expiry on read keeps correctness
    /// without it, this bounds memory under high unique-visitor volume.
    async fn evict_expired(&self) -> usize;

    /// Current counters.
    async fn stats(&self) -> CacheStats;
}
