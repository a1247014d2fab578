//! Rates, quotes and conversion results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::CurrencyCode;

/// Builds the cache key for a directed currency pair.
///
/// `USD->EUR` and `EUR->USD` get distinct keys; rates are never treated as
/// reciprocal.
pub fn cache_key(from: CurrencyCode, to: CurrencyCode) -> String {
    format!("rate:{}:{}", from, to)
}

/// Where a quoted rate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RateSource {
    /// Served from the rate cache.
    Cache,
    /// Fetched live from the named provider.
    Provider(String),
    /// Last-known rate from history, originally fetched from the named source.
    Fallback(String),
}

impl RateSource {
    const FALLBACK_PREFIX: &'static str = "fallback-";

    pub fn is_fallback(&self) -> bool {
        matches!(self, RateSource::Fallback(_))
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Cache => f.write_str("cache"),
            RateSource::Provider(name) => f.write_str(name),
            RateSource::Fallback(origin) => write!(f, "{}{}", Self::FALLBACK_PREFIX, origin),
        }
    }
}

impl From<String> for RateSource {
    fn from(value: String) -> Self {
        if value == "cache" {
            RateSource::Cache
        } else if let Some(origin) = value.strip_prefix(Self::FALLBACK_PREFIX) {
            RateSource::Fallback(origin.to_string())
        } else {
            RateSource::Provider(value)
        }
    }
}

impl From<RateSource> for String {
    fn from(source: RateSource) -> Self {
        source.to_string()
    }
}

/// A single rate for one unit of `from` expressed in `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate: f64,
    pub source: RateSource,
    pub timestamp: DateTime<Utc>,
}

impl RateQuote {
    pub fn new(rate: f64, source: RateSource) -> Self {
        Self {
            rate,
            source,
            timestamp: Utc::now(),
        }
    }
}

/// A cached rate with its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub rate: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(rate: f64, ttl: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            rate,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    /// Entries are served up to and including `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Rates returned by one provider call, keyed by target currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub source: String,
    pub rates: HashMap<CurrencyCode, f64>,
}

impl RateSnapshot {
    pub fn new(source: impl Into<String>, rates: HashMap<CurrencyCode, f64>) -> Self {
        Self {
            source: source.into(),
            rates,
        }
    }

    pub fn get(&self, currency: CurrencyCode) -> Option<f64> {
        self.rates.get(&currency).copied()
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub amount: f64,
    pub converted_amount: f64,
    pub cached: bool,
    pub source: RateSource,
    pub timestamp: DateTime<Utc>,
}

impl ConversionResult {
    pub fn from_quote(from: CurrencyCode, to: CurrencyCode, amount: f64, quote: RateQuote) -> Self {
        Self {
            from,
            to,
            rate: quote.rate,
            amount,
            converted_amount: amount * quote.rate,
            cached: quote.source == RateSource::Cache,
            source: quote.source,
            timestamp: quote.timestamp,
        }
    }
}
