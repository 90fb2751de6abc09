//! `/playlist/*`, `/playlist/track/*` handlers (spec.md §6). Mutations are
//! owner-or-admin on the playlist's `author_id`, mirroring
//! `original_source/backend/api/routers/playlist.py`'s
//! `require_owner_or_admin(..., "get_playlist", ...)` dependency.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::authorize::{owner_or_admin, owner_or_admin_indirect};
use crate::domain::playlist::PlaylistUpdate;
use crate::domain::{Pagination, SimilarityThreshold};
use crate::repository::playlists_repo::PlaylistSearch;

use super::RequireAuth;
use crate::web::dto::{
    AddPlaylistTrackRequest, CreatePlaylistRequest, PaginationQuery, PlaylistResponse, PlaylistTrackResponse, UpdatePlaylistRequest,
};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct PlaylistSearchQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub author_id: Option<i32>,
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

/// `POST /playlist/` — owner-or-admin (mode 1) on `author_id`.
pub async fn create(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<PlaylistResponse>), ApiError> {
    let author_id = owner_or_admin(&claims, body.author_id)?;
    let playlist = state.playlists.create(&state.pool, author_id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(PlaylistResponse::from(&playlist))))
}

/// `GET /playlist/` — public; `id` set fetches one playlist, otherwise a
/// fuzzy search.
pub async fn get(Query(query): Query<PlaylistSearchQuery>, State(state): State<AppState>) -> Result<Json<Vec<PlaylistResponse>>, ApiError> {
    if let Some(id) = query.id {
        let playlist = state.playlists.get_by_id(&state.pool, id).await?;
        return Ok(Json(vec![PlaylistResponse::from(&playlist)]));
    }

    let pagination = Pagination::new(query.pagination.skip.unwrap_or(0), query.pagination.limit.unwrap_or(Pagination::DEFAULT_LIMIT))?;
    let threshold = query.threshold.map(SimilarityThreshold::new).transpose()?.unwrap_or_default();

    let playlists = state
        .playlists
        .search(&state.pool, &PlaylistSearch { name: query.name, author_id: query.author_id, threshold, ..Default::default() }, &pagination)
        .await?;

    Ok(Json(playlists.iter().map(PlaylistResponse::from).collect()))
}

/// `PUT /playlist/` — owner-or-admin, resolved indirectly via the existing
/// row.
pub async fn update(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdatePlaylistRequest>,
) -> Result<Json<PlaylistResponse>, ApiError> {
    let playlists = &state.playlists;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(body.id), |id| async move { playlists.get_by_id(pool, id).await }).await?;

    let playlist = state.playlists.update(&state.pool, body.id, PlaylistUpdate { name: body.name }).await?;
    Ok(Json(PlaylistResponse::from(&playlist)))
}

/// `DELETE /playlist/` — owner-or-admin. Membership rows CASCADE.
pub async fn delete(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let playlists = &state.playlists;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(query.id), |id| async move { playlists.get_by_id(pool, id).await }).await?;

    state.playlists.delete(&state.pool, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct PlaylistIdQuery {
    pub playlist_id: i32,
}

/// `GET /playlist/track/` — public; lists a playlist's tracks in add order.
pub async fn list_tracks(
    Query(query): Query<PlaylistIdQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaylistTrackResponse>>, ApiError> {
    let tracks = state.playlist_tracks.list_by_playlist(&state.pool, query.playlist_id).await?;
    Ok(Json(tracks.iter().map(PlaylistTrackResponse::from).collect()))
}

/// `POST /playlist/track/` — owner-or-admin on the target playlist.
pub async fn add_track(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddPlaylistTrackRequest>,
) -> Result<(StatusCode, Json<PlaylistTrackResponse>), ApiError> {
    let playlists = &state.playlists;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(body.playlist_id), |id| async move { playlists.get_by_id(pool, id).await }).await?;

    let playlist_track = state.playlist_tracks.add(&state.pool, body.playlist_id, body.track_id).await?;
    Ok((StatusCode::CREATED, Json(PlaylistTrackResponse::from(&playlist_track))))
}

/// `DELETE /playlist/track/` — owner-or-admin on the target playlist.
pub async fn remove_track(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddPlaylistTrackRequest>,
) -> Result<StatusCode, ApiError> {
    let playlists = &state.playlists;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(body.playlist_id), |id| async move { playlists.get_by_id(pool, id).await }).await?;

    state.playlist_tracks.remove(&state.pool, body.playlist_id, body.track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
