//! `/album/*` handlers (spec.md §6). `create` goes through `MusicService`
//! for the optional cover upload; plain get/update go straight to
//! `PgAlbumsRepository`; delete goes through `MusicService` for the
//! track/blob cascade (spec.md §4.6 "Delete album").

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::authorize::{owner_or_admin, owner_or_admin_indirect};
use crate::domain::album::AlbumUpdate;
use crate::domain::{Pagination, SimilarityThreshold};
use crate::repository::albums_repo::AlbumSearch;
use crate::services::music::NewAlbumWithCover;

use super::{MultipartFields, RequireAuth};
use crate::web::dto::{AlbumResponse, PaginationQuery, UpdateAlbumRequest};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct AlbumSearchQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub artist_id: Option<i32>,
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

/// `GET /album/` — `id` set fetches one album; otherwise a fuzzy search
/// over the remaining filters (spec.md §4.2 "Search semantics").
pub async fn get(Query(query): Query<AlbumSearchQuery>, State(state): State<AppState>) -> Result<Json<Vec<AlbumResponse>>, ApiError> {
    if let Some(id) = query.id {
        let album = state.albums.get_by_id(&state.pool, id).await?;
        return Ok(Json(vec![AlbumResponse::from(&album)]));
    }

    let pagination = Pagination::new(query.pagination.skip.unwrap_or(0), query.pagination.limit.unwrap_or(Pagination::DEFAULT_LIMIT))?;
    let threshold = query.threshold.map(SimilarityThreshold::new).transpose()?.unwrap_or_default();

    let albums = state
        .albums
        .search(&state.pool, &AlbumSearch { name: query.name, artist_id: query.artist_id, threshold, ..Default::default() }, &pagination)
        .await?;

    Ok(Json(albums.iter().map(AlbumResponse::from).collect()))
}

/// `POST /album/` — multipart: name, artist_id?, release_date? (text,
/// `YYYY-MM-DD`), cover? (file). Creates a standalone Album with no tracks
/// (spec.md §6 "POST /album/"); tracks are attached afterwards via
/// `POST /track/file/`. `artist_id` follows spec.md §4.5 mode 1: unset
/// defaults to the caller, set must match the caller unless admin.
pub async fn create(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    multipart: axum::extract::Multipart,
) -> Result<Response, ApiError> {
    let fields = MultipartFields::collect(multipart).await?;

    let artist_id_field = fields
        .text_opt("artist_id")
        .map(|v| v.parse::<i32>().map_err(|_| ApiError::BadRequest("artist_id must be an integer".into())))
        .transpose()?;
    let artist_id = owner_or_admin(&claims, artist_id_field)?;

    let album = state
        .music
        .create_album(
            &state.pool,
            NewAlbumWithCover {
                name: fields.text("name")?,
                artist_id,
                release_date: parse_opt_date(fields.text_opt("release_date"))?,
                cover: fields.file_opt("cover"),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AlbumResponse::from(&album))).into_response())
}

fn parse_opt_date(value: Option<String>) -> Result<Option<chrono::NaiveDate>, ApiError> {
    value
        .map(|v| chrono::NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| ApiError::BadRequest("expected a date in YYYY-MM-DD form".into())))
        .transpose()
}

/// `PUT /album/` — owner-or-admin, resolved indirectly via the existing row
/// (spec.md §4.5 mode 2).
pub async fn update(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateAlbumRequest>,
) -> Result<Json<AlbumResponse>, ApiError> {
    let albums = &state.albums;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(body.id), |id| async move { albums.get_by_id(pool, id).await }).await?;

    let album = state.albums.update(&state.pool, body.id, AlbumUpdate { name: body.name, release_date: body.release_date.map(Some) }).await?;
    Ok(Json(AlbumResponse::from(&album)))
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

/// `DELETE /album/` — owner-or-admin, cascades tracks/blobs/cover via
/// `MusicService::delete_album`.
pub async fn delete(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let albums = &state.albums;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(query.id), |id| async move { albums.get_by_id(pool, id).await }).await?;

    state.music.delete_album(&state.pool, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
