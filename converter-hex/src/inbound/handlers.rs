//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use converter_types::{
    AppError, AppInfoResponse, ConvertQuery, ConvertResponse, ErrorResponse, HealthResponse,
    HistoryQuery, HistoryResponse, ProvidersResponse, RateRepository,
};

use crate::ConversionService;

pub(crate) const SERVICE_NAME: &str = "currency-converter";

/// Application state shared across handlers.
pub struct AppState<R: RateRepository> {
    pub service: ConversionService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint. Reports the cache as degraded rather than failing.
pub async fn health<R: RateRepository>(State(state): State<Arc<AppState<R>>>) -> impl IntoResponse {
    let cache = if state.service.cache().is_healthy() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: "OK".into(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.into(),
        cache: cache.into(),
    })
}

/// Service banner.
pub async fn app_info() -> impl IntoResponse {
    Json(AppInfoResponse {
        message: "Currency converter API".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state))]
pub async fn convert<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let req = query.validate().map_err(AppError::from)?;

    let result = state
        .service
        .convert(req.from, req.to, req.amount)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ConvertResponse {
        success: true,
        data: result.into(),
    }))
}

/// List provider health, ordered by priority.
#[tracing::instrument(skip(state))]
pub async fn provider_status<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let providers = state.service.provider_status().await?;
    Ok(Json(ProvidersResponse {
        success: true,
        data: providers,
    }))
}

/// Recent persisted rates for a pair.
#[tracing::instrument(skip(state))]
pub async fn rate_history<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let req = query.validate().map_err(AppError::from)?;
    let records = state
        .service
        .rate_history(req.from, req.to, req.limit)
        .await?;

    Ok(Json(HistoryResponse {
        success: true,
        data: records,
    }))
}
