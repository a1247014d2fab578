//! Database row types for SQLite and PostgreSQL.
//!
//! SQLite stores timestamps as RFC 3339 text and booleans as integers;
//! PostgreSQL uses native `TIMESTAMPTZ` and `BOOLEAN`.

use sqlx::FromRow;

use converter_types::{CurrencyCode, ProviderStatusRecord, RateHistoryRecord, StoreError};

fn parse_code(raw: &str) -> Result<CurrencyCode, StoreError> {
    CurrencyCode::new(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
mod sqlite_rows {
    use super::*;
    use chrono::{DateTime, SecondsFormat, Utc};

    /// Fixed-width UTC text so lexical order matches time order.
    pub fn format_ts(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Corrupt(format!("bad timestamp {:?}: {}", raw, e)))
    }

    fn parse_opt_ts(raw: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
        raw.as_deref().map(parse_ts).transpose()
    }

    /// Exchange rate row from SQLite.
    #[derive(FromRow)]
    pub struct SqliteRateRow {
        pub id: i64,
        pub from_currency: String,
        pub to_currency: String,
        pub rate: f64,
        pub source: String,
        pub created_at: String,
        pub expires_at: String,
    }

    impl SqliteRateRow {
        pub fn into_domain(self) -> Result<RateHistoryRecord, StoreError> {
            Ok(RateHistoryRecord {
                id: self.id,
                from_currency: parse_code(&self.from_currency)?,
                to_currency: parse_code(&self.to_currency)?,
                rate: self.rate,
                source: self.source,
                created_at: parse_ts(&self.created_at)?,
                expires_at: parse_ts(&self.expires_at)?,
            })
        }
    }

    /// Provider status row from SQLite.
    #[derive(FromRow)]
    pub struct SqliteSourceRow {
        pub name: String,
        pub base_url: String,
        pub priority: i32,
        pub is_active: bool,
        pub api_key_required: bool,
        pub last_success_at: Option<String>,
        pub last_failure_at: Option<String>,
        pub failure_count: i64,
    }

    impl SqliteSourceRow {
        pub fn into_domain(self) -> Result<ProviderStatusRecord, StoreError> {
            Ok(ProviderStatusRecord {
                name: self.name,
                base_url: self.base_url,
                priority: self.priority,
                is_active: self.is_active,
                requires_credential: self.api_key_required,
                last_success_at: parse_opt_ts(self.last_success_at)?,
                last_failure_at: parse_opt_ts(self.last_failure_at)?,
                failure_count: self.failure_count,
            })
        }
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite_rows::{SqliteRateRow, SqliteSourceRow, format_ts};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
mod pg_rows {
    use super::*;
    use chrono::{DateTime, Utc};

    /// Exchange rate row from PostgreSQL.
    #[derive(FromRow)]
    pub struct PgRateRow {
        pub id: i64,
        pub from_currency: String,
        pub to_currency: String,
        pub rate: f64,
        pub source: String,
        pub created_at: DateTime<Utc>,
        pub expires_at: DateTime<Utc>,
    }

    impl PgRateRow {
        pub fn into_domain(self) -> Result<RateHistoryRecord, StoreError> {
            Ok(RateHistoryRecord {
                id: self.id,
                from_currency: parse_code(&self.from_currency)?,
                to_currency: parse_code(&self.to_currency)?,
                rate: self.rate,
                source: self.source,
                created_at: self.created_at,
                expires_at: self.expires_at,
            })
        }
    }

    /// Provider status row from PostgreSQL.
    #[derive(FromRow)]
    pub struct PgSourceRow {
        pub name: String,
        pub base_url: String,
        pub priority: i32,
        pub is_active: bool,
        pub api_key_required: bool,
        pub last_success_at: Option<DateTime<Utc>>,
        pub last_failure_at: Option<DateTime<Utc>>,
        pub failure_count: i64,
    }

    impl From<PgSourceRow> for ProviderStatusRecord {
        fn from(row: PgSourceRow) -> Self {
            ProviderStatusRecord {
                name: row.name,
                base_url: row.base_url,
                priority: row.priority,
                is_active: row.is_active,
                requires_credential: row.api_key_required,
                last_success_at: row.last_success_at,
                last_failure_at: row.last_failure_at,
                failure_count: row.failure_count,
            }
        }
    }
}

#[cfg(feature = "postgres")]
pub use pg_rows::{PgRateRow, PgSourceRow};
