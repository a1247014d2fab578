//! Persisted rate history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CurrencyCode;

/// Nominal validity stamped on every history row. Fallback lookups ignore it.
pub const HISTORY_VALIDITY_SECS: i64 = 300;

/// One successfully fetched rate, appended after each provider success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateHistoryRecord {
    pub id: i64,
    #[schema(value_type = String, example = "USD")]
    pub from_currency: CurrencyCode,
    #[schema(value_type = String, example = "EUR")]
    pub to_currency: CurrencyCode,
    #[schema(example = 0.92)]
    pub rate: f64,
    #[schema(example = "exchangerates")]
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RateHistoryRecord {
    pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::seconds(HISTORY_VALIDITY_SECS)
    }
}
