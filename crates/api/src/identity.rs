//! Caller identity extracted from request headers.
//!
//! The storefront front end authenticates separately and forwards the
//! caller's identity: `x-user-id` for signed-in users and
//! `x-session-cart-id` for anonymous sessions. Either, both, or neither
//! may be present; each handler decides what it requires.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{RequestContext, SessionId, UserId};
use uuid::Uuid;

use crate::error::ApiError;

/// Extractor producing the caller's [`RequestContext`].
pub struct Identity(pub RequestContext);

fn parse_uuid_header(parts: &Parts, name: &str) -> Result<Option<Uuid>, ApiError> {
    match parts.headers.get(name) {
        Some(value) => {
            let text = value
                .to_str()
                .map_err(|_| ApiError::BadRequest(format!("Invalid {name} header")))?;
            let uuid = Uuid::parse_str(text)
                .map_err(|e| ApiError::BadRequest(format!("Invalid {name} header: {e}")))?;
            Ok(Some(uuid))
        }
        None => Ok(None),
    }
}

impl<St: Send + Sync> FromRequestParts<St> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        let user_id = parse_uuid_header(parts, "x-user-id")?.map(UserId::from_uuid);
        let session_id = parse_uuid_header(parts, "x-session-cart-id")?.map(SessionId::from_uuid);

        Ok(Identity(RequestContext {
            user_id,
            session_id,
        }))
    }
}
