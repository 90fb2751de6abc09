//! `/user_activity/*` handlers (spec.md §6). Authenticated but ownerless at
//! the HTTP boundary: any caller may append/list/query the telemetry
//! channel (spec.md §4.4 describes no per-event ownership check, unlike
//! Album/Track/Playlist).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::activity::Event;
use crate::repository::activity_repo::ActivityFilter;

use super::RequireAuth;
use crate::web::dto::{ActivityEventResponse, ActivityFilterRequest, AddActivityEventRequest};
use crate::web::error::ApiError;
use crate::web::AppState;

/// `POST /user_activity/` — `user_id` unset means the caller.
pub async fn add(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddActivityEventRequest>,
) -> Result<(StatusCode, Json<ActivityEventResponse>), ApiError> {
    let user_id = body.user_id.unwrap_or(claims.user_id);
    let event = state.activity.add(&state.pool, user_id, body.track_id, &body.event).await?;
    Ok((StatusCode::CREATED, Json(ActivityEventResponse::from(&event))))
}

/// `GET /user_activity/{id}`.
pub async fn get(
    RequireAuth(_claims): RequireAuth,
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ActivityEventResponse>, ApiError> {
    let event = state.activity.get(&state.pool, id).await?;
    Ok(Json(ActivityEventResponse::from(&event)))
}

/// `POST /user_activity/list` — conjunctive filter over the telemetry log.
pub async fn list(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ActivityFilterRequest>,
) -> Result<Json<Vec<ActivityEventResponse>>, ApiError> {
    let filter = to_activity_filter(body.ids, body.user_ids, body.track_ids, body.events, body.start_time, body.end_time)?;
    let events = state.activity.list(&state.pool, &filter, body.offset, body.limit).await?;
    Ok(Json(events.iter().map(ActivityEventResponse::from).collect()))
}

/// `POST /user_activity/delete` — same filter shape as `list`; returns the
/// number of rows removed.
pub async fn delete(
    RequireAuth(_claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ActivityFilterRequest>,
) -> Result<Json<u64>, ApiError> {
    let filter = to_activity_filter(body.ids, body.user_ids, body.track_ids, body.events, body.start_time, body.end_time)?;
    let deleted = state.activity.delete(&state.pool, &filter).await?;
    Ok(Json(deleted))
}

#[allow(clippy::too_many_arguments)]
fn to_activity_filter(
    ids: Vec<i64>,
    user_ids: Vec<i32>,
    track_ids: Vec<i32>,
    events: Vec<String>,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
    end_time: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<ActivityFilter, ApiError> {
    let events = events.iter().map(|e| Event::try_from(e.as_str())).collect::<Result<Vec<_>, _>>()?;
    Ok(ActivityFilter { ids, user_ids, track_ids, events, start_time, end_time })
}
