//! Extract the acting user id from the `X-User-ID` header.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

pub const USER_ID_HEADER: &str = "X-User-ID";

/// The user the request acts on behalf of. Missing or malformed header is `Unauthorized`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor(pub i64);

impl Actor {
    /// Only the owner may touch their cards.
    pub fn require(self, owner: i64) -> Result<(), AppError> {
        if self.0 != owner {
            return Err(AppError::forbidden());
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized(None))?;
        let id = raw
            .to_str()
            .map_err(|e| AppError::unauthorized(Some(Box::new(e))))?
            .trim()
            .parse::<i64>()
            .map_err(|e| AppError::unauthorized(Some(Box::new(e))))?;
        Ok(Actor(id))
    }
}
