//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ConversionResult, CurrencyCode, ProviderStatusRecord, RateHistoryRecord};
use crate::error::DomainError;

/// Most history rows a single request may ask for.
pub const MAX_HISTORY_LIMIT: u32 = 100;
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for a conversion.
///
/// Fields arrive as raw strings so malformed input is reported as a 400 with a
/// useful message instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    /// Source currency (3 letters)
    #[param(example = "USD")]
    pub from: Option<String>,
    /// Target currency (3 letters)
    #[param(example = "EUR")]
    pub to: Option<String>,
    /// Positive amount to convert, defaults to 1
    #[param(example = "100")]
    pub amount: Option<String>,
}

/// A validated conversion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertRequest {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
}

impl ConvertQuery {
    pub fn validate(&self) -> Result<ConvertRequest, DomainError> {
        let from = required_code(self.from.as_deref(), "from")?;
        let to = required_code(self.to.as_deref(), "to")?;
        let amount = match self.amount.as_deref().map(str::trim) {
            None | Some("") => 1.0,
            Some(raw) => parse_amount(raw)?,
        };
        Ok(ConvertRequest { from, to, amount })
    }
}

fn required_code(value: Option<&str>, field: &str) -> Result<CurrencyCode, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => CurrencyCode::new(v),
        _ => Err(DomainError::InvalidCurrencyCode(format!("\"{}\" is required", field))),
    }
}

fn parse_amount(raw: &str) -> Result<f64, DomainError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(DomainError::InvalidAmount(raw.to_string())),
    }
}

/// Conversion payload returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionData {
    #[schema(value_type = String, example = "USD")]
    pub from: CurrencyCode,
    #[schema(value_type = String, example = "EUR")]
    pub to: CurrencyCode,
    #[schema(example = 100.0)]
    pub amount: f64,
    #[schema(example = 85.0)]
    pub converted_amount: f64,
    #[schema(example = 0.85)]
    pub rate: f64,
    pub cached: bool,
    /// Provider name, `cache`, or `fallback-<provider>`
    #[schema(example = "exchangerates")]
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ConversionResult> for ConversionData {
    fn from(r: ConversionResult) -> Self {
        Self {
            from: r.from,
            to: r.to,
            amount: r.amount,
            converted_amount: r.converted_amount,
            rate: r.rate,
            cached: r.cached,
            source: r.source.to_string(),
            timestamp: r.timestamp,
        }
    }
}

/// Envelope for a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    pub success: bool,
    pub data: ConversionData,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider & History DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Envelope for provider status listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProvidersResponse {
    pub success: bool,
    pub data: Vec<ProviderStatusRecord>,
}

/// Query parameters for rate history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    #[param(example = "USD")]
    pub from: Option<String>,
    #[param(example = "EUR")]
    pub to: Option<String>,
    /// Number of rows, 1..=100, defaults to 10
    pub limit: Option<u32>,
}

/// A validated history request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRequest {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub limit: u32,
}

impl HistoryQuery {
    pub fn validate(&self) -> Result<HistoryRequest, DomainError> {
        Ok(HistoryRequest {
            from: required_code(self.from.as_deref(), "from")?,
            to: required_code(self.to.as_deref(), "to")?,
            limit: self
                .limit
                .unwrap_or(DEFAULT_HISTORY_LIMIT)
                .clamp(1, MAX_HISTORY_LIMIT),
        })
    }
}

/// Envelope for rate history listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<RateHistoryRecord>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Service DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "currency-converter")]
    pub service: String,
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub cache: String,
}

/// Root endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppInfoResponse {
    #[schema(example = "Currency converter API")]
    pub message: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    /// HTTP status code
    #[schema(example = 400)]
    pub code: u16,
}
