//! Rate limiting middleware using Governor.
//!
//! Implements per-client rate limiting with a token bucket algorithm. Buckets
//! idle long enough to have refilled are swept once the client map grows past
//! a threshold, so the map stays bounded by recently active clients.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::{
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};

use converter_types::ErrorResponse;

/// Client count at which idle buckets are swept.
const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

struct ClientLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    last_seen: Instant,
}

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-client rate limiters
    limiters: DashMap<String, ClientLimiter>,
    /// Quota for new clients
    quota: Quota,
    /// Time for an empty bucket to refill completely
    refill: Duration,
    sweep_threshold: usize,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state allowing `requests` per `period`.
    ///
    /// Zero values are raised to the smallest valid quota.
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let replenish = period / burst.get();
        let quota = Quota::with_period(replenish)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiters: DashMap::new(),
            quota,
            refill: quota.replenish_interval() * quota.burst_size().get(),
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }

    /// Sets the client count at which idle buckets are swept.
    pub fn with_sweep_threshold(mut self, clients: usize) -> Self {
        self.sweep_threshold = clients.max(1);
        self
    }

    /// Checks if a request should be rate limited.
    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        if self.limiters.len() >= self.sweep_threshold && !self.limiters.contains_key(key) {
            self.evict_idle(now);
        }

        let mut client = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| ClientLimiter {
                limiter: RateLimiter::direct(self.quota),
                last_seen: now,
            });
        client.last_seen = now;
        client.limiter.check().is_ok()
    }

    /// Drops buckets untouched for a full refill period as of `now`.
    ///
    /// A dropped bucket was already full, so a returning client sees the
    /// same quota it would have had. Returns how many were dropped.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.limiters.len();
        self.limiters
            .retain(|_, client| now.saturating_duration_since(client.last_seen) < self.refill);
        let evicted = before.saturating_sub(self.limiters.len());
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.limiters.len(), "Evicted idle rate limiters");
        }
        evicted
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiters.len()
    }
}

/// Identifies the caller by the first `X-Forwarded-For` hop.
fn client_key(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = client_key(&request);

    if !limiter.check(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                success: false,
                error: "Rate limit exceeded. Please try again later.".into(),
                code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}
