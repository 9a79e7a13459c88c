//! `/api` routes for users and their cards, behind the optional API key.

use crate::error::AppError;
use crate::handlers::{cards, users};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

/// Request bodies are small JSON objects.
const BODY_LIMIT: usize = 64 * 1024;

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(key) = state.api_key.as_deref() {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        if presented != Some(key) {
            return Err(AppError::unauthorized(None));
        }
    }
    Ok(next.run(request).await)
}

/// User routes share the `:user_id` segment name with the nested card routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/me", get(users::me))
        .route(
            "/users/:user_id",
            get(users::read).put(users::update).delete(users::delete),
        )
        .route(
            "/users/:user_id/cards",
            get(cards::list).post(cards::create),
        )
        .route(
            "/users/:user_id/cards/:id",
            get(cards::read).put(cards::update).delete(cards::delete),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}
