//! Redis-backed rate cache shared across instances.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};

use converter_types::{CacheEntry, RateCache};

/// Upper bound on establishing the initial connection.
const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

/// Rate cache over a Redis `ConnectionManager`.
///
/// Entries are stored as JSON with a server-side expiry matching the TTL. The
/// healthy flag drops on any Redis error and recovers on the next success.
pub struct RedisRateCache {
    conn: ConnectionManager,
    ttl_secs: u64,
    healthy: AtomicBool,
    /// Connection URL with any credentials masked.
    endpoint: String,
}

impl fmt::Debug for RedisRateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRateCache")
            .field("endpoint", &self.endpoint)
            .field("ttl_secs", &self.ttl_secs)
            .field("healthy", &self.is_healthy())
            .finish()
    }
}

impl RedisRateCache {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> anyhow::Result<Self> {
        let endpoint = redact_url(redis_url);
        tracing::info!(%endpoint, ttl_secs, "Connecting rate cache to Redis");
        let client = redis::Client::open(redis_url)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| anyhow::anyhow!("Timed out connecting to Redis at {}", endpoint))?
            .map_err(|e| anyhow::anyhow!("Failed to create Redis ConnectionManager: {}", e))?;

        Ok(Self {
            conn,
            ttl_secs,
            healthy: AtomicBool::new(true),
            endpoint,
        })
    }

    fn mark(&self, ok: bool) {
        let was = self.healthy.swap(ok, Ordering::Relaxed);
        if was != ok {
            if ok {
                tracing::info!("Redis cache recovered");
            } else {
                tracing::warn!("Redis cache marked unhealthy");
            }
        }
    }

    fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs.min(u32::MAX as u64) as i64)
    }
}

/// What a stored payload turned out to hold.
#[derive(Debug, PartialEq)]
enum Decoded {
    Live(CacheEntry),
    Expired,
    Corrupt(String),
}

fn decode_entry(raw: &str, now: DateTime<Utc>) -> Decoded {
    match serde_json::from_str::<CacheEntry>(raw) {
        Ok(entry) if entry.is_expired_at(now) => Decoded::Expired,
        Ok(entry) => Decoded::Live(entry),
        Err(e) => Decoded::Corrupt(e.to_string()),
    }
}

/// Masks the userinfo part of a URL: `redis://user:pw@host` becomes
/// `redis://***@host`.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (authority, path) = rest.split_at(authority_end);
    match authority.rsplit_once('@') {
        Some((_, host)) => format!("{}://***@{}{}", scheme, host, path),
        None => url.to_string(),
    }
}

#[async_trait]
impl RateCache for RedisRateCache {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut conn = self.conn.clone();
        let raw = match conn.get::<_, Option<String>>(key).await {
            Ok(raw) => {
                self.mark(true);
                raw?
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Redis GET failed");
                self.mark(false);
                return None;
            }
        };

        match decode_entry(&raw, Utc::now()) {
            Decoded::Live(entry) => Some(entry),
            Decoded::Expired => {
                tracing::debug!(key, "Cache entry expired");
                self.delete(key).await;
                None
            }
            Decoded::Corrupt(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                self.delete(key).await;
                None
            }
        }
    }

    async fn set(&self, key: &str, rate: f64) -> bool {
        let payload = match serde_json::to_string(&CacheEntry::new(rate, self.ttl())) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode cache entry");
                return false;
            }
        };

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(key, payload, self.ttl_secs).await {
            Ok(()) => {
                self.mark(true);
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Redis SETEX failed");
                self.mark(false);
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match conn.del::<_, i64>(key).await {
            Ok(count) => {
                self.mark(true);
                count > 0
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Redis DEL failed");
                self.mark(false);
                false
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}
