//! HTTP handlers for users and their cards.

pub mod cards;
pub mod users;

use crate::error::AppError;
use axum::{extract::rejection::JsonRejection, Json};

/// Unwrap a JSON body. Any rejection is reported as `InvalidParameter("body")`.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(v)| v).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        AppError::invalid_parameter("body")
    })
}
