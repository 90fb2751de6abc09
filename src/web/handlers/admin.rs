//! `POST /admin/bootstrap` (SPEC_FULL.md §3 "Supplemented features"),
//! grounded in `original_source/backend/api/admin.py`: HTTP Basic auth
//! checked against the configured `admin_bootstrap_key` (username is always
//! `"bootstrap"`, matching the original's `verify_secret_key`), gated so it
//! only ever succeeds once — after the first admin exists it is
//! permanently `Forbidden`.

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::web::dto::{BootstrapAdminRequest, UserResponse};
use crate::web::error::ApiError;
use crate::web::AppState;

fn verify_bootstrap_key(headers: &HeaderMap, expected_key: &str) -> Result<(), ApiError> {
    let header = headers.get(AUTHORIZATION).ok_or(ApiError::Unauthorized)?;
    let header = header.to_str().map_err(|_| ApiError::Unauthorized)?;
    let encoded = header.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;

    let decoded = STANDARD.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
    let decoded = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
    let (username, password) = decoded.split_once(':').ok_or(ApiError::Unauthorized)?;

    if username == "bootstrap" && password == expected_key {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// `POST /admin/bootstrap` — one-time first-admin creation.
pub async fn bootstrap(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(body): Json<BootstrapAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    verify_bootstrap_key(&headers, &state.admin_bootstrap_key)?;

    let admin = state.account.create_admin(&state.pool, body.name, body.username, &body.password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&admin))))
}
