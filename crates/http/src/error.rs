//! Error handling for the catalog HTTP layer
//!
//! Every failure reaches the client as one fixed plain-text message. Error
//! detail stays in the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: &'static str },

    #[error("bad request: {message}")]
    BadRequest {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound { message }
    }

    /// Create a bad request error
    pub fn bad_request(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::BadRequest {
            message,
            source: source.into(),
        }
    }

    /// Create an internal server error; `source` is logged, never sent
    pub fn internal(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The fixed text sent to the client
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::NotFound { message }
            | AppError::BadRequest { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Internal { source, .. } => tracing::error!(
                status_code = %status.as_u16(),
                error.cause_chain = ?source,
                error.message = %source,
                "request failed"
            ),
            AppError::BadRequest { source, .. } => tracing::warn!(
                status_code = %status.as_u16(),
                error.message = %source,
                "rejected request"
            ),
            AppError::NotFound { message } => {
                tracing::debug!(status_code = %status.as_u16(), %message, "not found")
            }
        }

        (status, self.public_message()).into_response()
    }
}
