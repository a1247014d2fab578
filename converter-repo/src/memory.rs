//! In-process rate cache.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use converter_types::{CacheEntry, RateCache};

/// Thread-safe rate cache with a fixed TTL.
///
/// Expired entries are removed lazily on read.
#[derive(Debug)]
pub struct MemoryRateCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryRateCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::seconds(ttl_secs.min(u32::MAX as u64) as i64),
        }
    }

    /// Stores an entry as-is, expiry included.
    pub fn put_entry(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Removes the entry under `key` only if it is still expired at `now`.
    ///
    /// A concurrent `set` may have replaced the entry since it was read.
    fn evict_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .remove_if(key, |_, e| e.is_expired_at(now))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateCache for MemoryRateCache {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = Utc::now();
        let entry = self.entries.get(key)?.clone();

        if entry.is_expired_at(now) {
            tracing::debug!(key, "Cache entry expired");
            self.evict_expired(key, now);
            return None;
        }

        tracing::debug!(key, "Cache hit");
        Some(entry)
    }

    async fn set(&self, key: &str, rate: f64) -> bool {
        self.entries
            .insert(key.to_string(), CacheEntry::new(rate, self.ttl));
        true
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
