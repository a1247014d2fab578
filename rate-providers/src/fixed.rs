//! Fixed in-process rates for development and testing.
//!
//! Each currency carries its value in USD; cross rates are derived as
//! `from_usd / to_usd`. Quotes are deterministic.

use std::collections::HashMap;

use converter_types::{CurrencyCode, ProviderDescriptor, ProviderError, RateProvider, RateSnapshot};

use crate::ProviderSettings;

pub const NAME: &str = "static";
pub(crate) const BASE_URL: &str = "static://table";

/// Declares the table as `CODE => value_in_usd`.
macro_rules! usd_table {
    ($($code:literal => $to_usd:expr),* $(,)?) => {
        const USD_VALUES: &[(&str, f64)] = &[$(($code, $to_usd)),*];
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Add new currencies here
// ─────────────────────────────────────────────────────────────────────────────

usd_table! {
    "USD" => 1.0,
    "EUR" => 1.087,
    "GBP" => 1.266,
    "INR" => 0.01203,
    "JPY" => 0.0067,
    "CAD" => 0.737,
    "AUD" => 0.658,
    "CHF" => 1.128,
}

fn usd_value(code: CurrencyCode) -> Option<f64> {
    USD_VALUES
        .iter()
        .find(|(c, _)| *c == code.as_str())
        .map(|(_, v)| *v)
}

pub struct StaticRateProvider {
    descriptor: ProviderDescriptor,
}

impl StaticRateProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            descriptor: settings.descriptor(NAME, false),
        }
    }
}

#[async_trait::async_trait]
impl RateProvider for StaticRateProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_rates(
        &self,
        base: CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<RateSnapshot, ProviderError> {
        let base_usd = usd_value(base)
            .ok_or_else(|| ProviderError::Upstream(format!("unsupported currency {}", base)))?;

        let rates: HashMap<CurrencyCode, f64> = targets
            .iter()
            .filter_map(|&t| {
                let rate = if t == base {
                    1.0
                } else {
                    base_usd / usd_value(t)?
                };
                Some((t, rate))
            })
            .collect();

        Ok(RateSnapshot::new(NAME, rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticRateProvider {
        StaticRateProvider::new(&ProviderSettings::new(true, 100, BASE_URL))
    }

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    #[tokio::test]
    async fn test_cross_rate() {
        let rate = provider().rate(code("USD"), code("INR")).await.unwrap();
        assert!((rate - 83.12).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_convert_currency_round_trip_is_close() {
        let p = provider();
        let inr = p.convert_currency(code("USD"), code("INR"), 100.0).await.unwrap();
        let usd = p.convert_currency(code("INR"), code("USD"), inr).await.unwrap();
        assert!((usd - 100.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_available() {
        let err = provider().rate(code("USD"), code("XAU")).await.unwrap_err();
        assert_eq!(err, ProviderError::RateNotAvailable(code("XAU")));
    }

    #[tokio::test]
    async fn test_unknown_base_fails() {
        assert!(matches!(
            provider().fetch_rates(code("XAU"), &[code("USD")]).await,
            Err(ProviderError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_quotes_are_deterministic() {
        let p = provider();
        let first = p.rate(code("EUR"), code("GBP")).await.unwrap();
        let second = p.rate(code("EUR"), code("GBP")).await.unwrap();
        assert_eq!(first, second);
        assert!((first - 1.087 / 1.266).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_same_currency_is_identity() {
        let rate = provider().rate(code("JPY"), code("JPY")).await.unwrap();
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn test_disabled_by_default() {
        let p = StaticRateProvider::new(&crate::ProvidersConfig::default().static_table);
        assert!(!p.is_active());
    }
}
