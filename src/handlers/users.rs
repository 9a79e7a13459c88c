//! User handlers. Listed users carry their live cards.

use crate::error::AppError;
use crate::extractors::{Actor, PathIds};
use crate::handlers::json_body;
use crate::list::{Filter, ListRequest};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{CreateUserRequest, UpdateUserRequest};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let request = ListRequest::from_query(params)?;
    let users = state.users.get_list(request, Filter::new()).await?;
    Ok(success_many(state.cards.attach_to(users).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create(json_body(body)?).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok(success_one(user))
}

pub async fn me(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get_by_id(actor.0).await?;
    Ok(success_one_ok(user))
}

pub async fn read(
    State(state): State<AppState>,
    ids: PathIds,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get_by_id(ids.get("user_id")?).await?;
    Ok(success_one_ok(user))
}

pub async fn update(
    State(state): State<AppState>,
    ids: PathIds,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = ids.get("user_id")?;
    let user = state.users.update(id, json_body(body)?).await?;
    Ok(success_one_ok(user))
}

/// Soft delete; `?hard=true` purges the row and its cards.
pub async fn delete(
    State(state): State<AppState>,
    ids: PathIds,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let id = ids.get("user_id")?;
    let hard = match params.get("hard").map(|v| v.trim()) {
        None | Some("") => false,
        Some(v) => v.parse().map_err(|_| AppError::invalid_parameter("hard"))?,
    };
    if hard {
        state.users.purge(id).await?;
        tracing::info!(user_id = id, "user purged");
    } else {
        state.users.delete(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
