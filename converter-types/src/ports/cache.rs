//! Rate cache port.

use crate::domain::{CacheEntry, CurrencyCode, cache_key};

/// Short-TTL key-value store for pair rates.
///
/// The TTL is fixed when the adapter is built. Storage errors never escape:
/// `get` degrades to a miss, `set` and `delete` report `false`.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync {
    /// Returns a live entry. Expired entries are deleted and reported as a miss.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores `rate` under `key` for the configured TTL.
    async fn set(&self, key: &str, rate: f64) -> bool;

    async fn delete(&self, key: &str) -> bool;

    /// Whether the backing store is currently reachable.
    fn is_healthy(&self) -> bool;

    fn derive_key(&self, from: CurrencyCode, to: CurrencyCode) -> String {
        cache_key(from, to)
    }
}
