//! SQLite store adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use converter_types::{
    CurrencyCode, ProviderDescriptor, ProviderStatusRecord, ProviderStatusStore,
    RateHistoryRecord, RateHistoryStore, StoreError,
};

use crate::types::{SqliteRateRow, SqliteSourceRow, format_ts};

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001", include_str!("../migrations/0001_create_exchange_rates.sql")),
    ("0002", include_str!("../migrations/0002_create_api_sources.sql")),
];

const RATE_COLUMNS: &str =
    "id, from_currency, to_currency, rate, source, created_at, expires_at";
const SOURCE_COLUMNS: &str = "name, base_url, priority, is_active, api_key_required, \
     last_success_at, last_failure_at, failure_count";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure on-disk SQLite target directory exists.
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every in-memory connection is its own database, so keep exactly one
        // and never let it be recycled.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema. Idempotent.
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        for (name, sql) in MIGRATIONS {
            for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                sqlx::query(statement)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StoreError::Database(format!("Migration {} failed: {}", name, e)))?;
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate history
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateHistoryStore for SqliteRepo {
    async fn append(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
        source: &str,
    ) -> Result<RateHistoryRecord, StoreError> {
        let created_at = Utc::now();
        let expires_at = RateHistoryRecord::expiry_for(created_at);

        let result = sqlx::query(
            r#"INSERT INTO exchange_rates (from_currency, to_currency, rate, source, created_at, expires_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(rate)
        .bind(source)
        .bind(format_ts(created_at))
        .bind(format_ts(expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(RateHistoryRecord {
            id: result.last_insert_rowid(),
            from_currency: from,
            to_currency: to,
            rate,
            source: source.to_string(),
            created_at,
            expires_at,
        })
    }

    async fn most_recent(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Option<RateHistoryRecord>, StoreError> {
        Ok(self.recent(from, to, 1).await?.into_iter().next())
    }

    async fn recent(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        limit: u32,
    ) -> Result<Vec<RateHistoryRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM exchange_rates \
             WHERE from_currency = ? AND to_currency = ? \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            RATE_COLUMNS
        );
        let rows: Vec<SqliteRateRow> = sqlx::query_as(&sql)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider status
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ProviderStatusStore for SqliteRepo {
    async fn register(&self, descriptor: &ProviderDescriptor) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO api_sources (name, base_url, priority, is_active, api_key_required, failure_count)
               VALUES (?, ?, ?, ?, ?, 0)
               ON CONFLICT(name) DO UPDATE SET
                   base_url = excluded.base_url,
                   priority = excluded.priority,
                   is_active = excluded.is_active,
                   api_key_required = excluded.api_key_required"#,
        )
        .bind(&descriptor.name)
        .bind(&descriptor.base_url)
        .bind(descriptor.priority)
        .bind(descriptor.is_active())
        .bind(descriptor.requires_credential)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn record_outcome(&self, name: &str, success: bool) -> Result<(), StoreError> {
        let sql = if success {
            "UPDATE api_sources SET last_success_at = ?, failure_count = 0 WHERE name = ?"
        } else {
            "UPDATE api_sources SET last_failure_at = ?, failure_count = failure_count + 1 WHERE name = ?"
        };

        let result = sqlx::query(sql)
            .bind(format_ts(Utc::now()))
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("provider {}", name)));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ProviderStatusRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM api_sources ORDER BY priority ASC, name ASC",
            SOURCE_COLUMNS
        );
        let rows: Vec<SqliteSourceRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(SqliteSourceRow::into_domain).collect()
    }

    async fn get(&self, name: &str) -> Result<Option<ProviderStatusRecord>, StoreError> {
        let sql = format!("SELECT {} FROM api_sources WHERE name = ?", SOURCE_COLUMNS);
        let row: Option<SqliteSourceRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(SqliteSourceRow::into_domain).transpose()
    }
}
