//! JSON error envelope shared by every handler (spec §4.4: `{error,
//! detail?}`, 4xx for validation, 5xx for internal failures).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "bad_request", Some(detail)),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "not_found", Some(detail)),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", Some(detail)),
        };
        (
            status,
            Json(ErrorBody {
                error: error.to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
