//! Success envelope shared by every endpoint.
//!
//! Failures are rendered by `AppError`'s `ResponseError` impl with the same
//! `success`/`message` fields plus machine codes in `errors`.

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    respond(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    respond(StatusCode::CREATED, message, data)
}

fn respond<T: Serialize>(status: StatusCode, message: &str, data: T) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::new(message, data))
}

/// Parse an id taken from the path; `what` names it in the error message.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidArgument(format!("invalid {} id '{}'", what, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let json = serde_json::to_value(ApiResponse::new("done", 3)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "done", "data": 3}));
    }

    #[test]
    fn malformed_ids_are_invalid_arguments() {
        assert!(parse_id(&Uuid::new_v4().to_string(), "video").is_ok());
        assert!(matches!(
            parse_id("42", "video"),
            Err(AppError::InvalidArgument(msg)) if msg.contains("video")
        ));
    }
}
