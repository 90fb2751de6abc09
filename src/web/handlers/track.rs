//! `/track/*` handlers (spec.md §6). `create_single`/`create_track`/`delete`
//! route through `MusicService` for the blob + cascade logic; plain
//! get/update/search go straight to `PgTracksRepository`.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::authorize::owner_or_admin_indirect;
use crate::domain::track::TrackUpdate;
use crate::domain::{Pagination, SimilarityThreshold};
use crate::repository::tracks_repo::TrackSearch;
use crate::services::music::{NewSingle, NewTrackOnAlbum};

use super::{parse_range_header, MultipartFields, RequireAuth};
use crate::web::dto::{PaginationQuery, TrackResponse, UpdateTrackRequest};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct TrackSearchQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub album_id: Option<i32>,
    pub artist_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

/// `GET /track/` — `id` set fetches one track; otherwise a fuzzy search.
pub async fn get(Query(query): Query<TrackSearchQuery>, State(state): State<AppState>) -> Result<Json<Vec<TrackResponse>>, ApiError> {
    if let Some(id) = query.id {
        let track = state.tracks.get_by_id(&state.pool, id).await?;
        return Ok(Json(vec![TrackResponse::from(&track)]));
    }

    let pagination = Pagination::new(query.pagination.skip.unwrap_or(0), query.pagination.limit.unwrap_or(Pagination::DEFAULT_LIMIT))?;
    let threshold = query.threshold.map(SimilarityThreshold::new).transpose()?.unwrap_or_default();

    let tracks = state
        .tracks
        .search(
            &state.pool,
            &TrackSearch { name: query.name, album_id: query.album_id, artist_id: query.artist_id, genre_id: query.genre_id, threshold, ..Default::default() },
            &pagination,
        )
        .await?;

    Ok(Json(tracks.iter().map(TrackResponse::from).collect()))
}

/// `POST /track/single/` — multipart: name, artist_id, genre_id?,
/// release_date? (text, `YYYY-MM-DD`), audio (file), cover? (file). Creates
/// a fresh Album and Track in one logical step (spec.md §4.6 "Create single").
pub async fn create_single(State(state): State<AppState>, multipart: axum::extract::Multipart) -> Result<Response, ApiError> {
    let fields = MultipartFields::collect(multipart).await?;
    let (audio, audio_content_type) = fields.file("audio")?;

    let (album, track) = state
        .music
        .create_single(
            &state.pool,
            NewSingle {
                name: fields.text("name")?,
                artist_id: fields.text("artist_id")?.parse().map_err(|_| ApiError::BadRequest("artist_id must be an integer".into()))?,
                genre_id: parse_opt_i32(fields.text_opt("genre_id"))?,
                release_date: parse_opt_date(fields.text_opt("release_date"))?,
                audio,
                audio_content_type,
                cover: fields.file_opt("cover"),
            },
        )
        .await?;

    let _ = album;
    Ok((StatusCode::CREATED, Json(TrackResponse::from(&track))).into_response())
}

/// `POST /track/file/` — multipart: name, album_id, artist_id, genre_id?,
/// release_date?, audio (file). Uploads a Track onto an already-existing
/// Album (spec.md §4.6 "Create track").
pub async fn create_track(State(state): State<AppState>, multipart: axum::extract::Multipart) -> Result<Response, ApiError> {
    let fields = MultipartFields::collect(multipart).await?;
    let (audio, audio_content_type) = fields.file("audio")?;

    let track = state
        .music
        .create_track(
            &state.pool,
            NewTrackOnAlbum {
                name: fields.text("name")?,
                album_id: fields.text("album_id")?.parse().map_err(|_| ApiError::BadRequest("album_id must be an integer".into()))?,
                artist_id: fields.text("artist_id")?.parse().map_err(|_| ApiError::BadRequest("artist_id must be an integer".into()))?,
                genre_id: parse_opt_i32(fields.text_opt("genre_id"))?,
                release_date: parse_opt_date(fields.text_opt("release_date"))?,
                audio,
                audio_content_type,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TrackResponse::from(&track))).into_response())
}

/// `PUT /track/` — owner-or-admin, resolved indirectly via the existing row.
pub async fn update(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateTrackRequest>,
) -> Result<Json<TrackResponse>, ApiError> {
    let tracks = &state.tracks;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(body.id), |id| async move { tracks.get_by_id(pool, id).await }).await?;

    let track = state
        .tracks
        .update(
            &state.pool,
            body.id,
            TrackUpdate { name: body.name, album_id: body.album_id, genre_id: Some(body.genre_id), release_date: body.release_date.map(Some) },
        )
        .await?;

    Ok(Json(TrackResponse::from(&track)))
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

/// `DELETE /track/` — owner-or-admin; cascades blob + empty-album reaping
/// via `MusicService::delete_track`.
pub async fn delete(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let tracks = &state.tracks;
    let pool = &state.pool;
    owner_or_admin_indirect(&claims, Some(query.id), |id| async move { tracks.get_by_id(pool, id).await }).await?;

    state.music.delete_track(&state.pool, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /track/stream/?id=…` — honors `Range: bytes=a-b` (spec.md §4.6/§4.8).
pub async fn stream(Query(query): Query<IdQuery>, State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let (start, end) = parse_range_header(range)?;

    let (stream, plan) = state.music.stream_track(&state.pool, query.id, start, end).await?;
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::PARTIAL_CONTENT,
        [
            (header::ACCEPT_RANGES, "bytes".to_string()),
            (header::CONTENT_RANGE, format!("bytes {}-{}/{}", plan.start, plan.end, plan.size)),
            (header::CONTENT_LENGTH, plan.content_length.to_string()),
        ],
        body,
    )
        .into_response())
}

/// `GET /track/image/?id=…` — public; a track's image is its album's cover
/// (spec.md §4.6 "Track image operations").
pub async fn image(Query(query): Query<IdQuery>, State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = state.music.get_track_image(&state.pool, query.id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

fn parse_opt_i32(value: Option<String>) -> Result<Option<i32>, ApiError> {
    value.map(|v| v.parse::<i32>().map_err(|_| ApiError::BadRequest("expected an integer".into()))).transpose()
}

fn parse_opt_date(value: Option<String>) -> Result<Option<chrono::NaiveDate>, ApiError> {
    value
        .map(|v| chrono::NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| ApiError::BadRequest("expected a date in YYYY-MM-DD form".into())))
        .transpose()
}
