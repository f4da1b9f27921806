use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::relay::RelayError;

pub enum ApiError {
    Relay(RelayError),
    Validation(String),
    Internal(String),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError::Relay(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Relay(e) => {
                let (status, code) = match e {
                    RelayError::NoRelayNodes => (StatusCode::SERVICE_UNAVAILABLE, "no_relay_nodes"),
                    RelayError::NoPath => (StatusCode::NOT_FOUND, "no_path"),
                    RelayError::UnknownLocation(_) => (StatusCode::BAD_REQUEST, "unknown_location"),
                    RelayError::UnknownNode(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "relay_error")
                    }
                };
                (status, Json(ErrorResponse::with_message(code, &e.to_string()))).into_response()
            }
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("internal_error")),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Router fallback for unmatched paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("not_found")))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
