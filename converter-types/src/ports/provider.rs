//! Rate provider port.
//!
//! Each implementation wraps one external rate source. Implementations only
//! fetch; selecting and validating a single rate is shared here.

use crate::domain::{CurrencyCode, ProviderDescriptor, RateSnapshot};
use crate::error::ProviderError;

/// Port trait for exchange rate providers.
///
/// Failures of any kind (transport, timeout, upstream error payloads) are
/// normalised into [`ProviderError`] at this boundary.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Static configuration of this provider.
    fn descriptor(&self) -> &ProviderDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn priority(&self) -> i32 {
        self.descriptor().priority
    }

    fn is_active(&self) -> bool {
        self.descriptor().is_active()
    }

    /// Fetches rates for one unit of `base` in each of `targets`.
    async fn fetch_rates(
        &self,
        base: CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<RateSnapshot, ProviderError>;

    /// Returns how many units of `to` one unit of `from` buys.
    ///
    /// Fails if the target is missing from the response or is not a finite
    /// positive number.
    async fn rate(&self, from: CurrencyCode, to: CurrencyCode) -> Result<f64, ProviderError> {
        let snapshot = self.fetch_rates(from, &[to]).await?;
        match snapshot.get(to) {
            Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
            Some(rate) => Err(ProviderError::InvalidRate { currency: to, rate }),
            None => Err(ProviderError::RateNotAvailable(to)),
        }
    }

    /// Converts `amount` of `from` into `to`.
    async fn convert_currency(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        amount: f64,
    ) -> Result<f64, ProviderError> {
        Ok(amount * self.rate(from, to).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Canned {
        descriptor: ProviderDescriptor,
        rates: Vec<(&'static str, f64)>,
    }

    #[async_trait::async_trait]
    impl RateProvider for Canned {
        fn descriptor(&self) -> &ProviderDescriptor {
            &self.descriptor
        }

        async fn fetch_rates(
            &self,
            _base: CurrencyCode,
            _targets: &[CurrencyCode],
        ) -> Result<RateSnapshot, ProviderError> {
            let rates: HashMap<_, _> = self
                .rates
                .iter()
                .map(|(c, r)| (CurrencyCode::new(c).unwrap(), *r))
                .collect();
            Ok(RateSnapshot::new(self.name(), rates))
        }
    }

    fn canned(rates: Vec<(&'static str, f64)>) -> Canned {
        Canned {
            descriptor: ProviderDescriptor::new("canned", 1, true, "http://x", None, false),
            rates,
        }
    }

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    #[tokio::test]
    async fn test_convert_currency_multiplies() {
        let p = canned(vec![("EUR", 0.85)]);
        let out = p.convert_currency(code("USD"), code("EUR"), 100.0).await.unwrap();
        assert!((out - 85.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_target_fails() {
        let p = canned(vec![("GBP", 0.7)]);
        let err = p.rate(code("USD"), code("EUR")).await.unwrap_err();
        assert_eq!(err, ProviderError::RateNotAvailable(code("EUR")));
    }

    #[tokio::test]
    async fn test_non_positive_rate_fails() {
        let p = canned(vec![("EUR", 0.0)]);
        assert!(matches!(
            p.rate(code("USD"), code("EUR")).await,
            Err(ProviderError::InvalidRate { .. })
        ));
    }
}
