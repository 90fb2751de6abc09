//! `/user/*`, `/artist/*` handlers (spec.md §6). Thin: each handler parses
//! its request shape, resolves authorization, calls one service method, and
//! maps the result to a DTO — the pattern the teacher's `serve_track` uses
//! for its own single repository call.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::authorize::{owner_or_admin, owner_or_user};
use crate::domain::user::UserUpdate;
use crate::domain::{Pagination, SimilarityThreshold};
use crate::repository::users_repo::UserSearch;

use super::{MultipartFields, OptionalAuth, RequireAuth};
use crate::web::dto::{
    ArtistResponse, AuthResponse, LoginRequest, PaginationQuery, SubscribeRequest, SubscriptionResponse, UpdateUserRequest, UserResponse,
};
use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

#[derive(Deserialize)]
pub struct ArtistIdQuery {
    pub artist_id: i32,
}

#[derive(Deserialize)]
pub struct SubscriberQuery {
    pub subscriber_id: Option<i32>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Deserialize)]
pub struct SubscribersQuery {
    pub artist_id: i32,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// `POST /user/register/` — multipart: name, username, password,
/// description? (text), cover? (file). Creates the user, its default "fav"
/// playlist, and optionally its profile image, then signs a session token.
pub async fn register(State(state): State<AppState>, multipart: Multipart) -> Result<Response, ApiError> {
    let fields = MultipartFields::collect(multipart).await?;

    let (user, _fav) = state
        .account
        .register(
            &state.pool,
            crate::services::account::NewAccount {
                name: fields.text("name")?,
                description: fields.text_opt("description"),
                username: fields.text("username")?,
                password: fields.text("password")?,
            },
        )
        .await?;

    if let Some((bytes, content_type)) = fields.file_opt("cover") {
        state.account.put_user_image(user.id(), bytes, &content_type).await?;
    }

    let token = state.tokens.sign(user.id(), user.role())?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(token))).into_response())
}

/// `POST /user/login/`.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Result<Json<AuthResponse>, ApiError> {
    let user = state.account.login(&state.pool, &body.username, &body.password).await?;
    let token = state.tokens.sign(user.id(), user.role())?;
    Ok(Json(AuthResponse::new(token)))
}

/// `GET /user/` — self-or-admin (mode 1); unset `id` means the caller.
pub async fn get_user(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = owner_or_admin(&claims, query.id)?;
    let user = state.account.get_user(&state.pool, id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// `PUT /user/` — self-or-admin (mode 1). Plaintext `password`, if present,
/// is hashed here, before it ever reaches the service layer.
pub async fn update_user(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = owner_or_admin(&claims, body.id)?;

    if body.role.is_some() {
        crate::auth::authorize::admin_only(&claims)?;
    }

    let password_hash = body.password.map(|p| crate::auth::password::hash(&p)).transpose()?;

    let update = UserUpdate {
        name: body.name,
        description: body.description.map(Some),
        username: body.username,
        password_hash,
        role: body.role,
    };

    let user = state.account.update_user(&state.pool, id, update).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// `DELETE /user/` — self-or-admin (mode 1), cascading per spec.md §4.7.
pub async fn delete_user(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let id = owner_or_admin(&claims, query.id)?;
    state.account.delete_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /user/image/` — public read (mode 3).
pub async fn get_user_image(
    OptionalAuth(claims): OptionalAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let id = owner_or_user(claims.as_ref(), query.id)?;
    let bytes = state.account.get_user_image(id).await?;
    Ok(([(axum::http::header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// `PUT /user/image/` — self-or-admin (mode 1), multipart: image (file).
pub async fn put_user_image(
    RequireAuth(claims): RequireAuth,
    Query(query): Query<IdQuery>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let id = owner_or_admin(&claims, query.id)?;
    let fields = MultipartFields::collect(multipart).await?;
    let (bytes, content_type) = fields.file("image")?;
    state.account.put_user_image(id, bytes, &content_type).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /user/subscribe` — self-or-admin (mode 1) on `subscriber_id`.
pub async fn subscribe(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscriber_id = owner_or_admin(&claims, body.subscriber_id)?;
    let subscription = state.account.subscribe(&state.pool, subscriber_id, body.artist_id).await?;
    Ok(Json(SubscriptionResponse::from(&subscription)))
}

/// `POST /user/unsubscribe` — self-or-admin (mode 1) on `subscriber_id`.
pub async fn unsubscribe(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<StatusCode, ApiError> {
    let subscriber_id = owner_or_admin(&claims, body.subscriber_id)?;
    state.account.unsubscribe(&state.pool, subscriber_id, body.artist_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /user/subscriptions` — public read (mode 3); unset `subscriber_id`
/// means the caller.
pub async fn list_subscriptions(
    OptionalAuth(claims): OptionalAuth,
    Query(query): Query<SubscriberQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriber_id = owner_or_user(claims.as_ref(), query.subscriber_id)?;
    let subscriptions = state.account.list_subscriptions(&state.pool, subscriber_id, query.skip, query.limit).await?;
    Ok(Json(subscriptions.iter().map(SubscriptionResponse::from).collect()))
}

/// `GET /user/subscribers` — public read; `artist_id` is always explicit.
pub async fn list_subscribers(
    Query(query): Query<SubscribersQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscribers = state.account.list_subscribers(&state.pool, query.artist_id, query.skip, query.limit).await?;
    Ok(Json(subscribers.iter().map(SubscriptionResponse::from).collect()))
}

/// `GET /user/subscriber-count` — public read.
pub async fn subscriber_count(
    Query(query): Query<ArtistIdQuery>,
    State(state): State<AppState>,
) -> Result<Json<i64>, ApiError> {
    let count = state.account.subscriber_count(&state.pool, query.artist_id).await?;
    Ok(Json(count))
}

/// `GET /artist/` — public artist profile projection (GLOSSARY: "Artist").
pub async fn get_artist(
    Query(query): Query<ArtistIdQuery>,
    State(state): State<AppState>,
) -> Result<Json<ArtistResponse>, ApiError> {
    let (user, subscriber_count) = state.account.get_artist_profile(&state.pool, query.artist_id).await?;

    Ok(Json(ArtistResponse {
        id: user.id(),
        name: user.name().to_string(),
        description: user.description().map(str::to_string),
        subscriber_count,
    }))
}

#[derive(Deserialize)]
pub struct ArtistSearchQuery {
    pub name: Option<String>,
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

/// `GET /artists/` — public fuzzy artist search (SPEC_FULL.md §3
/// "Supplemented features"), mirroring `/album/`'s id-or-search shape but
/// without an `id` branch: there's no single-artist variant here, `/artist/`
/// already covers that.
pub async fn get_artists(Query(query): Query<ArtistSearchQuery>, State(state): State<AppState>) -> Result<Json<Vec<ArtistResponse>>, ApiError> {
    let pagination = Pagination::new(query.pagination.skip.unwrap_or(0), query.pagination.limit.unwrap_or(Pagination::DEFAULT_LIMIT))?;
    let threshold = query.threshold.map(SimilarityThreshold::new).transpose()?.unwrap_or_default();

    let artists = state.account.search_artists(&state.pool, &UserSearch { name: query.name, threshold, ..Default::default() }, &pagination).await?;

    Ok(Json(
        artists
            .iter()
            .map(|(user, subscriber_count)| ArtistResponse {
                id: user.id(),
                name: user.name().to_string(),
                description: user.description().map(str::to_string),
                subscriber_count: *subscriber_count,
            })
            .collect(),
    ))
}
