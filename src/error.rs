// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error body is `{"error": <machine-readable kind>}`. Upstream and
//! storage failures are logged here and never echoed to the client.

use crate::config::ConfigError;
use crate::db::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid request: {0}")]
    BadRequest(&'static str),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Store operation failed ({code}): {source}")]
    Store {
        code: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a mapper for store failures that answer with `code`.
    pub fn store(code: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { code, source }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "not_authenticated".to_string())
            }
            AppError::BadRequest(code) => (StatusCode::BAD_REQUEST, code.to_string()),
            AppError::Configuration(err) => {
                tracing::error!(error = %err, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::Store { code, source } => {
                tracing::error!(error = %source, code, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, code.to_string())
            }
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream error");
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error".to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".to_string())
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
