//! Request identity for engagement-service
//!
//! Authentication happens at the API gateway, which forwards the verified
//! user id in the `x-user-id` header. Handlers take [`UserId`] as an extractor
//! when they need an actor, or `Option<UserId>` when one is optional.

use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Acting user's id taken from the gateway header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl UserId {
    fn from_headers(req: &HttpRequest) -> Result<Self, AppError> {
        let raw = req
            .headers()
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("User ID missing".to_string()))?;
        let raw = raw
            .to_str()
            .map_err(|_| AppError::Unauthorized("User ID header is not valid text".to_string()))?;
        Uuid::parse_str(raw.trim())
            .map(UserId)
            .map_err(|_| AppError::Unauthorized(format!("malformed user id '{}'", raw)))
    }
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_user_id_header() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(UserId::from_headers(&req).unwrap(), UserId(id));
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        let missing = TestRequest::default().to_http_request();
        assert!(matches!(
            UserId::from_headers(&missing),
            Err(AppError::Unauthorized(_))
        ));

        let malformed = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(
            UserId::from_headers(&malformed),
            Err(AppError::Unauthorized(_))
        ));
    }
}
