//! Conversion Application Service
//!
//! Answers conversion requests from the cache, the rate providers in priority
//! order, or the last persisted rate, in that order. Contains NO
//! infrastructure logic: every collaborator comes in through a port.

use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;

use converter_types::{
    AppError, ConversionError, ConversionResult, CurrencyCode, ProviderStatusRecord, RateCache,
    RateHistoryRecord, RateProvider, RateQuote, RateRepository, RateSource, StoreError,
};

/// Result of a best-effort write made after a conversion.
///
/// Failures are logged and never change the conversion outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    Applied,
    Failed,
}

impl SideEffect {
    pub(crate) fn observe<E: Display>(
        effect: &'static str,
        target: &str,
        result: Result<(), E>,
    ) -> Self {
        match result {
            Ok(()) => SideEffect::Applied,
            Err(e) => {
                tracing::warn!(effect, target, error = %e, "Best-effort write failed");
                SideEffect::Failed
            }
        }
    }
}

/// Application service for currency conversion.
///
/// Generic over `R: RateRepository` - the store adapter is injected at compile
/// time. Providers and the cache are trait objects so any mix of sources can be
/// configured at start-up.
pub struct ConversionService<R: RateRepository> {
    repo: R,
    cache: Arc<dyn RateCache>,
    /// Ascending priority; ties keep configuration order.
    providers: Vec<Arc<dyn RateProvider>>,
}

impl<R: RateRepository> ConversionService<R> {
    /// Creates a new conversion service. Providers are ordered by priority.
    pub fn new(
        repo: R,
        cache: Arc<dyn RateCache>,
        mut providers: Vec<Arc<dyn RateProvider>>,
    ) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self {
            repo,
            cache,
            providers,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &dyn RateCache {
        self.cache.as_ref()
    }

    pub fn providers(&self) -> &[Arc<dyn RateProvider>] {
        &self.providers
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Start-up
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers every provider (active or not) in the status store.
    ///
    /// Stops at the first store failure.
    pub async fn register_providers(&self) -> Result<(), StoreError> {
        for provider in &self.providers {
            self.repo.register(provider.descriptor()).await?;
        }
        tracing::info!(count = self.providers.len(), "Registered rate providers");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts `amount` of `from` into `to`.
    ///
    /// Fails only when the cache misses, every active provider fails and no
    /// history exists for the exact pair.
    #[tracing::instrument(skip(self, from, to), fields(from = %from, to = %to))]
    pub async fn convert(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        amount: f64,
    ) -> Result<ConversionResult, ConversionError> {
        let key = self.cache.derive_key(from, to);

        if let Some(entry) = self.cache.get(&key).await {
            if entry.rate.is_finite() && entry.rate > 0.0 {
                tracing::debug!("Serving rate from cache");
                let quote = RateQuote::new(entry.rate, RateSource::Cache);
                return Ok(ConversionResult::from_quote(from, to, amount, quote));
            }
            tracing::warn!(rate = entry.rate, "Ignoring non-positive cached rate");
        }

        let mut attempted = 0usize;
        let mut failures = Vec::new();

        for provider in self.providers.iter().filter(|p| p.is_active()) {
            let name = provider.name();
            attempted += 1;
            match provider.rate(from, to).await {
                Ok(rate) => {
                    tracing::info!(provider = name, rate, "Fetched rate");
                    let effects = self.record_success(&key, from, to, rate, name).await;
                    tracing::debug!(?effects, "Recorded provider success");
                    let quote = RateQuote::new(rate, RateSource::Provider(name.to_string()));
                    return Ok(ConversionResult::from_quote(from, to, amount, quote));
                }
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "Rate provider failed");
                    failures.push(format!("provider {} failed: {}", name, e));
                    SideEffect::observe(
                        "status",
                        name,
                        self.repo.record_outcome(name, false).await,
                    );
                }
            }
        }

        let fallback_error = match self.repo.most_recent(from, to).await {
            Ok(Some(record)) => {
                tracing::warn!(
                    origin = %record.source,
                    recorded_at = %record.created_at,
                    "All providers failed, serving last known rate"
                );
                let quote = RateQuote {
                    rate: record.rate,
                    source: RateSource::Fallback(record.source),
                    timestamp: Utc::now(),
                };
                return Ok(ConversionResult::from_quote(from, to, amount, quote));
            }
            Ok(None) => None,
            Err(e) => Some(e.to_string()),
        };

        let err = if attempted == 0 {
            ConversionError::NoActiveProviders {
                from,
                to,
                fallback_error,
            }
        } else {
            ConversionError::Exhausted {
                from,
                to,
                failures,
                fallback_error,
            }
        };
        tracing::error!(error = %err, "Conversion failed");
        Err(err)
    }

    /// Cache, then history, then status. Each write is independent.
    async fn record_success(
        &self,
        key: &str,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
        provider: &str,
    ) -> [SideEffect; 3] {
        let cached = if self.cache.set(key, rate).await {
            SideEffect::Applied
        } else {
            SideEffect::observe("cache", key, Err("cache write rejected"))
        };

        let history = SideEffect::observe(
            "history",
            provider,
            self.repo.append(from, to, rate, provider).await.map(|_| ()),
        );

        let status = SideEffect::observe(
            "status",
            provider,
            self.repo.record_outcome(provider, true).await,
        );

        [cached, history, status]
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reporting
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists provider health ordered by priority.
    pub async fn provider_status(&self) -> Result<Vec<ProviderStatusRecord>, AppError> {
        self.repo.list_all().await.map_err(Into::into)
    }

    /// Most recent `limit` rates for the exact pair, newest first.
    pub async fn rate_history(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        limit: u32,
    ) -> Result<Vec<RateHistoryRecord>, AppError> {
        self.repo.recent(from, to, limit).await.map_err(Into::into)
    }
}
