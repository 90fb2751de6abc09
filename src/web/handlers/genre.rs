//! `/genre/*` handlers (spec.md §6). Unauthenticated, matching
//! `original_source/backend/api/routers/genre.py` — a Genre has no owner,
//! so there is no ownership check to run.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::genre::GenreUpdate;
use crate::domain::{Pagination, SimilarityThreshold};
use crate::repository::genres_repo::GenreSearch;

use crate::web::dto::{CreateGenreRequest, GenreResponse, PaginationQuery, UpdateGenreRequest};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct GenreSearchQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

/// `POST /genre/`.
pub async fn create(State(state): State<AppState>, Json(body): Json<CreateGenreRequest>) -> Result<(StatusCode, Json<GenreResponse>), ApiError> {
    let genre = state.genres.create(&state.pool, &body.name).await?;
    Ok((StatusCode::CREATED, Json(GenreResponse::from(&genre))))
}

/// `GET /genre/` — `id` set fetches one genre; otherwise a fuzzy search.
pub async fn get(Query(query): Query<GenreSearchQuery>, State(state): State<AppState>) -> Result<Json<Vec<GenreResponse>>, ApiError> {
    if let Some(id) = query.id {
        let genre = state.genres.get_by_id(&state.pool, id).await?;
        return Ok(Json(vec![GenreResponse::from(&genre)]));
    }

    let pagination = Pagination::new(query.pagination.skip.unwrap_or(0), query.pagination.limit.unwrap_or(Pagination::DEFAULT_LIMIT))?;
    let threshold = query.threshold.map(SimilarityThreshold::new).transpose()?.unwrap_or_default();

    let genres = state.genres.search(&state.pool, &GenreSearch { name: query.name, threshold, ..Default::default() }, &pagination).await?;
    Ok(Json(genres.iter().map(GenreResponse::from).collect()))
}

/// `PUT /genre/`.
pub async fn update(State(state): State<AppState>, Json(body): Json<UpdateGenreRequest>) -> Result<Json<GenreResponse>, ApiError> {
    let genre = state.genres.update(&state.pool, body.id, GenreUpdate { name: body.name }).await?;
    Ok(Json(GenreResponse::from(&genre)))
}

/// `DELETE /genre/` — SETs `tracks.genre_id` to NULL via FK, no cascade.
pub async fn delete(Query(query): Query<IdQuery>, State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.genres.delete(&state.pool, query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
