//! Durable store ports.
//!
//! Adapters (Postgres, SQLite) implement both traits. Errors are returned to
//! the caller; the conversion service decides which ones are fatal.

use crate::domain::{CurrencyCode, ProviderDescriptor, ProviderStatusRecord, RateHistoryRecord};
use crate::error::StoreError;

/// Append-only log of successfully fetched rates.
#[async_trait::async_trait]
pub trait RateHistoryStore: Send + Sync + 'static {
    /// Appends a rate, stamping `created_at` and `expires_at`.
    async fn append(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
        source: &str,
    ) -> Result<RateHistoryRecord, StoreError>;

    /// Most recent record for the exact `(from, to)` pair.
    async fn most_recent(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Option<RateHistoryRecord>, StoreError>;

    /// Up to `limit` records for the pair, newest first.
    async fn recent(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        limit: u32,
    ) -> Result<Vec<RateHistoryRecord>, StoreError>;
}

/// Per-provider success/failure bookkeeping.
#[async_trait::async_trait]
pub trait ProviderStatusStore: Send + Sync + 'static {
    /// Inserts or refreshes a provider row, keeping its counters.
    async fn register(&self, descriptor: &ProviderDescriptor) -> Result<(), StoreError>;

    /// On success resets the failure streak and stamps `last_success_at`;
    /// on failure increments it and stamps `last_failure_at`.
    async fn record_outcome(&self, name: &str, success: bool) -> Result<(), StoreError>;

    /// All providers ordered by priority ascending.
    async fn list_all(&self) -> Result<Vec<ProviderStatusRecord>, StoreError>;

    async fn get(&self, name: &str) -> Result<Option<ProviderStatusRecord>, StoreError>;
}

/// Both stores behind one handle, as the service holds them.
pub trait RateRepository: RateHistoryStore + ProviderStatusStore {}

impl<T: RateHistoryStore + ProviderStatusStore> RateRepository for T {}
