//! fixer.io: keyed by `access_key`, reports errors in a 200 body.

use std::collections::HashMap;
use std::time::Duration;

use converter_types::{CurrencyCode, ProviderDescriptor, ProviderError, RateProvider, RateSnapshot};
use serde::Deserialize;

use crate::ProviderSettings;
use crate::http::{HttpFetcher, join_codes, select_targets};

pub const NAME: &str = "fixer";
pub(crate) const DEFAULT_BASE_URL: &str = "http://data.fixer.io/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct FixerError {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    info: Option<String>,
}

impl FixerError {
    fn message(&self) -> String {
        match (self.kind.as_deref(), self.info.as_deref()) {
            (Some(kind), Some(info)) => format!("{}: {}", kind, info),
            (Some(kind), None) => kind.to_string(),
            (None, Some(info)) => info.to_string(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

fn translate_error(body: &str) -> Option<String> {
    let parsed: LatestResponse = serde_json::from_str(body).ok()?;
    parsed.error.map(|e| e.message())
}

pub struct FixerProvider {
    descriptor: ProviderDescriptor,
    http: HttpFetcher,
}

impl FixerProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            descriptor: settings.descriptor(NAME, true),
            http: HttpFetcher::new(NAME, settings.timeout.unwrap_or(DEFAULT_TIMEOUT))?,
        })
    }
}

#[async_trait::async_trait]
impl RateProvider for FixerProvider {
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
            .ok_or_else(|| ProviderError::MissingCredential("Fixer".into()))?;

        let url = format!("{}/latest", self.descriptor.base_url);
        let symbols = join_codes(targets);
        let query = [
            ("access_key", key),
            ("base", base.as_str()),
            ("symbols", symbols.as_str()),
        ];

        let data: LatestResponse = self.http.get_json(&url, &query, translate_error).await?;

        if !data.success {
            let message = data
                .error
                .map(|e| e.message())
                .unwrap_or_else(|| "unknown error".into());
            return Err(ProviderError::Upstream(message));
        }

        let rates = data
            .rates
            .ok_or_else(|| ProviderError::MalformedResponse("missing rates from Fixer".into()))?;

        Ok(RateSnapshot::new(NAME, select_targets(rates, targets)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_joins_type_and_info() {
        let body = r#"{"success":false,"error":{"type":"Invalid access_key","info":"Invalid API key"}}"#;
        assert_eq!(
            translate_error(body).as_deref(),
            Some("Invalid access_key: Invalid API key")
        );
    }

    #[test]
    fn test_error_message_without_info() {
        let body = r#"{"success":false,"error":{"type":"base_currency_access_restricted"}}"#;
        assert_eq!(
            translate_error(body).as_deref(),
            Some("base_currency_access_restricted")
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let settings = ProviderSettings::new(true, 3, "http://127.0.0.1:9");
        let provider = FixerProvider::new(&settings).unwrap();
        assert!(!provider.is_active());

        let err = provider
            .fetch_rates(
                CurrencyCode::new("USD").unwrap(),
                &[CurrencyCode::new("EUR").unwrap()],
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Fixer API key is missing");
    }
}
