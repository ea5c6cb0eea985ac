use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry::FutureFetchError;

pub enum ApiError {
    Future(FutureFetchError),
}

impl From<FutureFetchError> for ApiError {
    fn from(e: FutureFetchError) -> Self {
        ApiError::Future(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Future(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_detail("future_failed", &e.detail)),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn with_detail(error: &str, detail: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            detail: Some(detail.to_string()),
        }
    }
}
