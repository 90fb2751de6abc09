//! `/track_queue/*` handlers (spec.md §6, §4.3). `user_id` follows mode 1
//! (owner-or-admin): unset resolves to the caller.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::authorize::owner_or_admin;

use super::RequireAuth;
use crate::web::dto::{QueueDeleteQuery, QueueInsertRequest, QueueListQuery, QueueMoveRequest, QueuePushRequest, QueueRemoveRequest, QueueResponse};
use crate::web::error::ApiError;
use crate::web::AppState;

/// `POST /track_queue/left`.
pub async fn push_left(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<QueuePushRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = owner_or_admin(&claims, body.user_id)?;
    state.queue.push_left(user_id, body.track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /track_queue/right`.
pub async fn push_right(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<QueuePushRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = owner_or_admin(&claims, body.user_id)?;
    state.queue.push_right(user_id, body.track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /track_queue/`.
pub async fn list(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<QueueListQuery>,
    State(state): State<AppState>,
) -> Result<Json<QueueResponse>, ApiError> {
    let user_id = owner_or_admin(&claims, query.user_id)?;
    let tracks = state.queue.list(user_id, query.offset, query.limit).await?;
    Ok(Json(QueueResponse { tracks }))
}

/// `DELETE /track_queue/`.
pub async fn delete(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<QueueDeleteQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let user_id = owner_or_admin(&claims, query.user_id)?;
    state.queue.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /track_queue/insert`.
pub async fn insert(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<QueueInsertRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = owner_or_admin(&claims, body.user_id)?;
    state.queue.insert(user_id, body.track_id, body.position).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /track_queue/move`.
pub async fn move_track(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<QueueMoveRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = owner_or_admin(&claims, body.user_id)?;
    state.queue.move_track(user_id, body.src, body.dest).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /track_queue/remove`.
pub async fn remove(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<QueueRemoveRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = owner_or_admin(&claims, body.user_id)?;
    state.queue.remove(user_id, body.position).await?;
    Ok(StatusCode::NO_CONTENT)
}
