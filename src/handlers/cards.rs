//! Card handlers. Every route is nested under its owner and requires the owner to be the actor.

use crate::error::AppError;
use crate::extractors::{Actor, PathIds};
use crate::handlers::json_body;
use crate::list::ListRequest;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{CreateCardRequest, UpdateCardRequest};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;

/// Owner from the path, checked against the actor.
fn owner(ids: &PathIds, actor: Actor) -> Result<i64, AppError> {
    let owner = ids.get("user_id")?;
    actor.require(owner)?;
    Ok(owner)
}

pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    ids: PathIds,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner(&ids, actor)?;
    let request = ListRequest::from_query(params)?;
    Ok(success_many(state.cards.list(owner, request).await?))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ids: PathIds,
    body: Result<Json<CreateCardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner(&ids, actor)?;
    let card = state.cards.create(owner, json_body(body)?).await?;
    Ok(success_one(card))
}

pub async fn read(
    State(state): State<AppState>,
    actor: Actor,
    ids: PathIds,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner(&ids, actor)?;
    let card = state.cards.get(owner, ids.get("id")?).await?;
    Ok(success_one_ok(card))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    ids: PathIds,
    body: Result<Json<UpdateCardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner(&ids, actor)?;
    let id = ids.get("id")?;
    let card = state.cards.update(owner, id, json_body(body)?).await?;
    Ok(success_one_ok(card))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    ids: PathIds,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner(&ids, actor)?;
    state.cards.delete(owner, ids.get("id")?).await?;
    Ok(StatusCode::NO_CONTENT)
}
