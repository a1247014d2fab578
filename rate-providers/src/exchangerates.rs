//! exchangerate-api.com: keyless, returns every rate for a base currency.

use std::collections::HashMap;
use std::time::Duration;

use converter_types::{CurrencyCode, ProviderDescriptor, ProviderError, RateProvider, RateSnapshot};
use serde::Deserialize;

use crate::ProviderSettings;
use crate::http::{HttpFetcher, select_targets};

pub const NAME: &str = "exchangerates";
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com/v4";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
}

fn translate_error(body: &str) -> Option<String> {
    let parsed: LatestResponse = serde_json::from_str(body).ok()?;
    parsed.error_type
}

pub struct ExchangeRatesProvider {
    descriptor: ProviderDescriptor,
    http: HttpFetcher,
}

impl ExchangeRatesProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            descriptor: settings.descriptor(NAME, false),
            http: HttpFetcher::new(NAME, settings.timeout.unwrap_or(DEFAULT_TIMEOUT))?,
        })
    }
}

#[async_trait::async_trait]
impl RateProvider for ExchangeRatesProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_rates(
        &self,
        base: CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<RateSnapshot, ProviderError> {
        let url = format!("{}/latest/{}", self.descriptor.base_url, base);
        let data: LatestResponse = self.http.get_json(&url, &[], translate_error).await?;

        if data.result.as_deref() == Some("error") {
            return Err(ProviderError::Upstream(
                data.error_type.unwrap_or_else(|| "unknown error".into()),
            ));
        }

        let rates = data.rates.ok_or_else(|| {
            ProviderError::MalformedResponse("missing rates from ExchangeRates API".into())
        })?;

        tracing::debug!(provider = NAME, received = rates.len(), "ExchangeRates API response");

        Ok(RateSnapshot::new(NAME, select_targets(rates, targets)))
    }
}
