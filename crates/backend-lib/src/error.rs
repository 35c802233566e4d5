// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::storage::StoreError;
use crate::validation::ValidationError;

/// Message sent when a protected route is called without a bearer token
pub const NO_TOKEN: &str = "No token";
/// Message sent for every token verification failure
pub const INVALID_TOKEN: &str = "Invalid token";
/// Message sent for both unknown emails and wrong passwords
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate resource: {0}")]
    DuplicateResource(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Store not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateResource(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotConfigured(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "VAL_001",
            AppError::DuplicateResource(_) => "DUP_001",
            AppError::Unauthorized(_) => "AUTH_001",
            AppError::NotConfigured(_) => "CFG_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Message safe to hand to a client. Store and runtime details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::DuplicateResource(msg) => msg.clone(),
            AppError::Unauthorized(msg) => (*msg).to_string(),
            AppError::NotConfigured(_) => "No database configured".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        match &self {
            AppError::Internal(detail) => tracing::error!(code = error_code, %detail, "request failed"),
            AppError::NotConfigured(what) => tracing::error!(code = error_code, what, "store not configured"),
            AppError::Unauthorized(reason) => tracing::debug!(code = error_code, reason, "request rejected"),
            _ => tracing::debug!(code = error_code, error = %self, "request rejected"),
        }

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.public_message(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::DuplicateResource(what),
            StoreError::NotConfigured(what) => AppError::NotConfigured(what),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => AppError::Internal(detail),
            TokenError::Expired | TokenError::Invalid => AppError::Unauthorized(INVALID_TOKEN),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}
