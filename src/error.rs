// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::classifier::ClassifierError;
use crate::services::spotify::MusicError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User not logged in")]
    Unauthorized,

    #[error("Spotify token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Emotion classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Spotify API error: {0}")]
    MusicApi(#[from] MusicError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body.
///
/// `error` is human readable; the page script shows it and matches on
/// "User not logged in".
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::TokenRefresh(_) => (StatusCode::UNAUTHORIZED, "token_refresh_failed"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Classifier(_) => (StatusCode::BAD_GATEWAY, "classifier_error"),
            AppError::MusicApi(_) => (StatusCode::BAD_GATEWAY, "music_service_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (error, details) = match &self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("Internal server error".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("Internal server error".to_string(), None)
            }
            AppError::TokenRefresh(msg) => {
                tracing::warn!(error = %msg, "Token refresh failed");
                (
                    "Spotify session expired, please log in again".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Classifier(err) => {
                tracing::error!(error = %err, "Emotion classification failed");
                (self.to_string(), None)
            }
            AppError::MusicApi(err) => {
                tracing::error!(error = %err, "Spotify request failed");
                (self.to_string(), None)
            }
            AppError::Unauthorized | AppError::BadRequest(_) => (self.to_string(), None),
        };

        let body = ErrorResponse {
            error,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
