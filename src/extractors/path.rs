//! Integer ids from path segments. A bad segment is `InvalidParameter(<segment name>)`.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;

pub struct PathIds(HashMap<String, String>);

impl PathIds {
    pub fn get(&self, name: &'static str) -> Result<i64, AppError> {
        self.0
            .get(name)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| AppError::invalid_parameter(name))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PathIds
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params): Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::invalid_parameter("id"))?;
        Ok(PathIds(params))
    }
}
