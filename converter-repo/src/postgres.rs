//! PostgreSQL store adapter.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use converter_types::{
    CurrencyCode, ProviderDescriptor, ProviderStatusRecord, ProviderStatusStore,
    RateHistoryRecord, RateHistoryStore, StoreError,
};

use crate::types::{PgRateRow, PgSourceRow};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL store shared by every server instance.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_api_sources_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate history
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateHistoryStore for PostgresRepo {
    async fn append(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
        source: &str,
    ) -> Result<RateHistoryRecord, StoreError> {
        let created_at = Utc::now();

        let row: PgRateRow = sqlx::query_as(
            r#"INSERT INTO exchange_rates (from_currency, to_currency, rate, source, created_at, expires_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, from_currency, to_currency, rate, source, created_at, expires_at"#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(rate)
        .bind(source)
        .bind(created_at)
        .bind(RateHistoryRecord::expiry_for(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.into_domain()
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
        let rows: Vec<PgRateRow> = sqlx::query_as(
            r#"SELECT id, from_currency, to_currency, rate, source, created_at, expires_at
               FROM exchange_rates
               WHERE from_currency = $1 AND to_currency = $2
               ORDER BY created_at DESC, id DESC
               LIMIT $3"#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider status
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ProviderStatusStore for PostgresRepo {
    async fn register(&self, descriptor: &ProviderDescriptor) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO api_sources (name, base_url, priority, is_active, api_key_required, failure_count)
               VALUES ($1, $2, $3, $4, $5, 0)
               ON CONFLICT (name) DO UPDATE SET
                   base_url = EXCLUDED.base_url,
                   priority = EXCLUDED.priority,
                   is_active = EXCLUDED.is_active,
                   api_key_required = EXCLUDED.api_key_required"#,
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
            "UPDATE api_sources SET last_success_at = $1, failure_count = 0 WHERE name = $2"
        } else {
            "UPDATE api_sources SET last_failure_at = $1, failure_count = failure_count + 1 WHERE name = $2"
        };

        let result = sqlx::query(sql)
            .bind(Utc::now())
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
        let rows: Vec<PgSourceRow> = sqlx::query_as(
            r#"SELECT name, base_url, priority, is_active, api_key_required,
                      last_success_at, last_failure_at, failure_count
               FROM api_sources
               ORDER BY priority ASC, name ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(ProviderStatusRecord::from).collect())
    }

    async fn get(&self, name: &str) -> Result<Option<ProviderStatusRecord>, StoreError> {
        let row: Option<PgSourceRow> = sqlx::query_as(
            r#"SELECT name, base_url, priority, is_active, api_key_required,
                      last_success_at, last_failure_at, failure_count
               FROM api_sources
               WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(ProviderStatusRecord::from))
    }
}
