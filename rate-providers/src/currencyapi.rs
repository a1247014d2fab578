//! currencyapi.com: keyed by `apikey`, nests each rate under its code.

use std::collections::HashMap;
use std::time::Duration;

use converter_types::{CurrencyCode, ProviderDescriptor, ProviderError, RateProvider, RateSnapshot};
use serde::Deserialize;

use crate::ProviderSettings;
use crate::http::{HttpFetcher, join_codes, select_targets};

pub const NAME: &str = "currencyapi";
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.currencyapi.com/v3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    data: Option<HashMap<String, Quote>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn translate_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body).ok().map(|e| e.message)
}

pub struct CurrencyApiProvider {
    descriptor: ProviderDescriptor,
    http: HttpFetcher,
}

impl CurrencyApiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            descriptor: settings.descriptor(NAME, true),
            http: HttpFetcher::new(NAME, settings.timeout.unwrap_or(DEFAULT_TIMEOUT))?,
        })
    }
}

#[async_trait::async_trait]
impl RateProvider for CurrencyApiProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_rates(
        &self,
        base: CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<RateSnapshot, ProviderError> {
        let key = self
            .descriptor
            .credential
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential("CurrencyAPI".into()))?;

        let url = format!("{}/latest", self.descriptor.base_url);
        let currencies = join_codes(targets);
        let query = [
            ("apikey", key),
            ("base_currency", base.as_str()),
            ("currencies", currencies.as_str()),
        ];

        let body: LatestResponse = self.http.get_json(&url, &query, translate_error).await?;
        let data = body.data.ok_or_else(|| {
            ProviderError::MalformedResponse("missing data from CurrencyAPI".into())
        })?;

        let rates = data.into_iter().map(|(code, q)| (code, q.value)).collect();
        Ok(RateSnapshot::new(NAME, select_targets(rates, targets)))
    }
}
