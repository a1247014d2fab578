//! # Converter Client SDK
//!
//! A typed Rust client for the Currency Converter API.

use converter_types::{
    ConversionData, ConvertResponse, CurrencyCode, HealthResponse, HistoryResponse,
    ProviderStatusRecord, ProvidersResponse, RateHistoryRecord,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Currency Converter API client.
pub struct ConverterClient {
    base_url: String,
    http: Client,
}

impl ConverterClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Fetches the health report.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health", &[]).await
    }

    /// Converts `amount` of `from` into `to`. The server defaults the amount to 1.
    pub async fn convert(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        amount: Option<f64>,
    ) -> Result<ConversionData, ClientError> {
        let amount = amount.map(|a| a.to_string());
        let mut query = vec![("from", from.to_string()), ("to", to.to_string())];
        if let Some(amount) = amount {
            query.push(("amount", amount));
        }
        let resp: ConvertResponse = self.get("/api/currency/convert", &query).await?;
        Ok(resp.data)
    }

    /// Lists provider health, ordered by priority.
    pub async fn providers(&self) -> Result<Vec<ProviderStatusRecord>, ClientError> {
        let resp: ProvidersResponse = self.get("/api/currency/providers", &[]).await?;
        Ok(resp.data)
    }

    /// Recent persisted rates for a pair, newest first.
    pub async fn history(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
        limit: Option<u32>,
    ) -> Result<Vec<RateHistoryRecord>, ClientError> {
        let mut query = vec![("from", from.to_string()), ("to", to.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let resp: HistoryResponse = self.get("/api/currency/history", &query).await?;
        Ok(resp.data)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Pulls `error` out of an error envelope, or returns the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
