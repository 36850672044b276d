//! API error taxonomy and its HTTP mapping.
//!
//! Every error response carries a JSON body `{message}`. Validation failures
//! carry one message per failing field. Internal faults are logged here and
//! surfaced with a generic message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-fixable input problems; one message per failing field.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Missing, malformed, tampered, or expired session token.
    #[error("unauthorized")]
    Unauthorized,

    /// Login with an unknown email or a wrong password. Both cases are
    /// reported identically so the response leaks nothing about which
    /// accounts exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but the role does not grant this operation.
    #[error("forbidden")]
    Forbidden,

    /// Resource absent, or present but not owned by the caller. The two are
    /// intentionally indistinguishable.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Anything unexpected. Never shown to the caller verbatim.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Single-message validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(messages) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": messages })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "unauthorized" })),
            )
                .into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials" })),
            )
                .into_response(),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Forbidden" })),
            )
                .into_response(),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{} not found", what) })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                eprintln!("[api] internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Something went wrong" })),
                )
                    .into_response()
            }
        }
    }
}
