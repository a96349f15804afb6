//! Route handlers and error-to-response mapping.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use crate::error::{ErrorPayload, ExtractionError};
use crate::output::ServiceInfo;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub url: Option<String>,
}

/// Maps an extraction failure to its status and JSON body.
pub fn error_to_response(err: &ExtractionError) -> (StatusCode, Json<ErrorPayload>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_payload()))
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        error_to_response(&self).into_response()
    }
}

pub async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ServiceInfo::new(state.environment))
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    match state.extractor.extract_raw(params.url.as_deref()).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Serverless entry point: scrapes when a non-empty `url` is given,
/// otherwise describes the service.
pub async fn api(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    if params.url.as_deref().filter(|u| !u.is_empty()).is_none() {
        return info(State(state)).await.into_response();
    }
    scrape(State(state), Query(params)).await
}

/// Bare `OPTIONS`: 200 with an empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
