//! Sharded in-memory profile cache.
//!
//! Fixed array of shards, each a `RwLock<HashMap>`, with the shard picked
//! from the fingerprint digest. Unrelated fingerprints land on different
//! shards and never contend on one lock, which is the concurrency contract
//! the port requires. Expiry is lazy on read; `evict_expired` sweeps
//! entries past the grace bound to keep memory bounded under high
//! unique-visitor volume.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::domain::persona::PersonaDecision;
use crate::domain::signal::Fingerprint;
use crate::ports::{CacheConfig, CacheEntry, CacheStats, ProfileCache};

/// In-memory, process-local profile cache.
///
/// One instance per process, shared across request handlers via `Arc`.
/// Re-initializes empty on process start; there is no cross-restart or
/// cross-instance durability by design.
#[derive(Debug)]
pub struct ShardedProfileCache {
    config: CacheConfig,
    shards: Vec<RwLock<HashMap<Fingerprint, CacheEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ShardedProfileCache {
    /// Creates a cache with the given configuration.
    ///
    /// `config.shards` must be non-zero; config validation guarantees it
    /// before this is reached.
    pub fn new(config: CacheConfig) -> Self {
        let shards = (0..config.shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            config,
            shards,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    fn shard_for(&self, fingerprint: &Fingerprint) -> &RwLock<HashMap<Fingerprint, CacheEntry>> {
        &self.shards[fingerprint.shard(self.shards.len())]
    }

    /// Inserts a pre-stamped entry, replacing any existing one.
    ///
    /// Lets tests and warm-start tooling insert entries with a historical
    /// `created_at`; the normal write path is [`put`](ProfileCache::put).
    pub async fn insert_entry(&self, fingerprint: Fingerprint, entry: CacheEntry) {
        let mut shard = self.shard_for(&fingerprint).write().await;
        shard.insert(fingerprint, entry);
    }
}

#[async_trait]
impl ProfileCache for ShardedProfileCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let now = Timestamp::now();
        let shard = self.shard_for(fingerprint).read().await;
        match shard.get(fingerprint) {
            Some(entry) if entry.is_fresh(now, self.config.ttl_ms) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(*entry)
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn get_stale(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let now = Timestamp::now();
        let shard = self.shard_for(fingerprint).read().await;
        shard
            .get(fingerprint)
            .filter(|entry| entry.within_grace(now, self.config.grace_ms))
            .copied()
    }

    async fn put(&self, fingerprint: Fingerprint, decision: PersonaDecision) {
        let entry = CacheEntry::new(decision, Timestamp::now());
        let mut shard = self.shard_for(&fingerprint).write().await;
        shard.insert(fingerprint, entry);
    }

    async fn evict_expired(&self) -> usize {
        let now = Timestamp::now();
        let mut evicted = 0;
        for shard in &self.shards {
            let mut shard = shard.write().await;
            let before = shard.len();
            shard.retain(|_, entry| entry.within_grace(now, self.config.grace_ms));
            evicted += before - shard.len();
        }
        evicted
    }

    async fn stats(&self) -> CacheStats {
        let mut entries = 0;
        for shard in &self.shards {
            entries += shard.read().await.len();
        }
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}
