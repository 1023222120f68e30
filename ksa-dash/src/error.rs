//! Error types for ksa-dash
//!
//! Every failure reaching a handler becomes
//! `{"error": {"code", "message", "retryable"}}` with a status matching its
//! kind: 400 bad input, 404 missing, 409 policy conflict, 422 classifier
//! refusal, 429/503 upstream asks to wait, 502 other upstream failures,
//! 500 store failures and failed background tasks.

use crate::classifier::ClassifierError;
use crate::services::{ImportError, YouTubeError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Refused by the preprocessing guard or prediction policy (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Feature needs configuration that is absent (503)
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Uploaded CSV rejected (400)
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Classifier refused the training data (422)
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// YouTube API failure
    #[error(transparent)]
    YouTube(#[from] YouTubeError),

    /// ksa-common error (store, config)
    #[error(transparent)]
    Common(#[from] ksa_common::Error),

    /// Blocking CPU task panicked or was cancelled (500)
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::YouTube(err) => err.is_retryable(),
            ApiError::Common(err) => err.is_retryable(),
            ApiError::Import(err) => err.is_retryable(),
            ApiError::Classifier(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            ApiError::Import(_) => (StatusCode::BAD_REQUEST, "INVALID_CSV"),
            ApiError::Classifier(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CLASSIFIER_REJECTED"),
            ApiError::YouTube(err) => match err {
                YouTubeError::NotFound(_) => (StatusCode::NOT_FOUND, "VIDEO_NOT_FOUND"),
                YouTubeError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "UPSTREAM_RATE_LIMITED"),
                YouTubeError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE"),
                YouTubeError::Network(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_NETWORK"),
                YouTubeError::Api(..) | YouTubeError::Parse(_) => {
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
                }
            },
            ApiError::Common(err) => match err {
                ksa_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ksa_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ksa_common::Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            ApiError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let retryable = self.is_retryable();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = error_code, retryable, "{}", message);
        } else {
            tracing::warn!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "retryable": retryable,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
