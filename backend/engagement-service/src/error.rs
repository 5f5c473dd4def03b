//! Error types for engagement-service
//!
//! Every failure a request can hit is an `AppError`. Errors render through
//! actix-web's `ResponseError` into the uniform `{success, message, errors}`
//! envelope, with the status code derived from the error kind.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Result type for engagement-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed id, missing required field, out-of-range paging values
    #[error("{0}")]
    InvalidArgument(String),

    /// Like target id is malformed or the referenced entity does not exist
    #[error("Invalid like target: {0}")]
    InvalidTarget(String),

    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),

    /// Actor required but absent or unverified
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("No view to remove")]
    ViewNotFound,

    #[error("Not subscribed to any channel")]
    NoSubscriptions,

    #[error("No videos found from the subscribed channels")]
    NoVideosFound,

    /// Natural-key violation outside the toggle path
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code so callers can branch on the failure.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::InvalidTarget(_) => "INVALID_TARGET",
            AppError::InvalidSortKey(_) => "INVALID_SORT_KEY",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ViewNotFound => "VIEW_NOT_FOUND",
            AppError::NoSubscriptions => "NO_SUBSCRIPTIONS",
            AppError::NoVideosFound => "NO_VIDEOS_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Message safe to hand back to a client. Store failures never leak
    /// driver detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    errors: Vec<&'static str>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_)
            | AppError::InvalidTarget(_)
            | AppError::InvalidSortKey(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_)
            | AppError::ViewNotFound
            | AppError::NoSubscriptions
            | AppError::NoVideosFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "request rejected");
        }

        HttpResponse::build(status).json(ErrorBody {
            success: false,
            message: self.public_message(),
            errors: vec![self.code()],
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}
