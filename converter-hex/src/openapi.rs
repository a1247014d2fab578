//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use converter_types::domain::{ProviderStatusRecord, RateHistoryRecord};
use converter_types::dto::{
    AppInfoResponse, ConversionData, ConvertQuery, ConvertResponse, ErrorResponse,
    HealthResponse, HistoryQuery, HistoryResponse, ProvidersResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service name and version", body = AppInfoResponse)
    )
)]
async fn app_info() {}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up; cache may be degraded", body = HealthResponse)
    )
)]
async fn health() {}

/// Convert an amount between two currencies
#[utoipa::path(
    get,
    path = "/api/currency/convert",
    tag = "currency",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Conversion succeeded", body = ConvertResponse),
        (status = 400, description = "Invalid currency code or amount", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "No provider or fallback could supply a rate", body = ErrorResponse)
    )
)]
async fn convert() {}

/// List rate providers and their health
#[utoipa::path(
    get,
    path = "/api/currency/providers",
    tag = "currency",
    responses(
        (status = 200, description = "Providers ordered by priority", body = ProvidersResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn providers() {}

/// Recent persisted rates for a currency pair
#[utoipa::path(
    get,
    path = "/api/currency/history",
    tag = "currency",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Rates, newest first", body = HistoryResponse),
        (status = 400, description = "Invalid currency code", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn history() {}

/// OpenAPI documentation for the Currency Converter API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Converter API",
        version = "1.0.0",
        description = "Currency conversion backed by a rate cache, prioritised rate providers and a persisted fallback history.",
        license(name = "MIT"),
    ),
    paths(app_info, health, convert, providers, history),
    components(
        schemas(
            AppInfoResponse,
            HealthResponse,
            ConversionData,
            ConvertResponse,
            ProvidersResponse,
            ProviderStatusRecord,
            HistoryResponse,
            RateHistoryRecord,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currency", description = "Conversion, providers and rate history"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for route in [
            "/",
            "/health",
            "/api/currency/convert",
            "/api/currency/providers",
            "/api/currency/history",
        ] {
            assert!(paths.iter().any(|p| p == route), "missing {route}");
        }
    }
}
