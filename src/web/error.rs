//! Fixed error-kind → HTTP-status mapping (spec.md §4.8). Every service/
//! repository error funnels through `ApiError`, following the teacher's
//! practice of a single boundary error type that each layer's error
//! converts into via `From` (`examples/Ocean50ul-home-server` has no
//! boundary errors of its own since it never leaves HTML rendering, but the
//! `#[from]`-per-layer shape is the same one `RepositoryError` and
//! `SyncServiceError` use).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::authorize::{AuthError, IndirectAuthError};
use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;
use crate::domain::activity::EventParseError;
use crate::domain::ValidationError;
use crate::repository::blob_repo::BlobError;
use crate::repository::queue_repo::QueueError;
use crate::repository::RepositoryError;
use crate::services::{AccountServiceError, ActivityServiceError, MusicServiceError, QueueServiceError};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("caller does not own this resource")]
    Forbidden,

    #[error("{0}")]
    Unprocessable(String),

    #[error("range start {start} is past the end of a {size}-byte file")]
    InvalidStart { start: u64, size: u64 },

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidStart { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if matches!(status, StatusCode::INTERNAL_SERVER_ERROR) {
            log::error!("internal error: {self}");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { kind, id } => ApiError::NotFound(format!("{kind} with id {id} was not found")),
            RepositoryError::AlreadyExists { kind, key } => ApiError::BadRequest(format!("{kind} with key '{key}' already exists")),
            RepositoryError::ConstraintViolation { description } => ApiError::BadRequest(description),
            RepositoryError::Validation(e) => ApiError::BadRequest(e.to_string()),
            RepositoryError::ConnectionError(e) => ApiError::Internal(e),
            RepositoryError::RowDecodingError(e) => ApiError::Internal(e),
            RepositoryError::GenericDatabaseError(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::MusicFileNotFound => ApiError::NotFound("track audio file was not found".into()),
            BlobError::ImageFileNotFound => ApiError::NotFound("image file was not found".into()),
            BlobError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<MusicServiceError> for ApiError {
    fn from(err: MusicServiceError) -> Self {
        match err {
            MusicServiceError::Repository(e) => e.into(),
            MusicServiceError::Blob(e) => e.into(),
            MusicServiceError::InvalidStart { start, size } => ApiError::InvalidStart { start, size },
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(err: AccountServiceError) -> Self {
        match err {
            AccountServiceError::Repository(e) => e.into(),
            AccountServiceError::Blob(e) => e.into(),
            AccountServiceError::Validation(e) => e.into(),
            AccountServiceError::Password(e) => ApiError::from(e),
            AccountServiceError::Music(e) => e.into(),
            AccountServiceError::FavPlaylistCreationFailed(e) => ApiError::Internal(e.to_string()),
            AccountServiceError::AdminAlreadyExists => ApiError::Forbidden,
        }
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<QueueServiceError> for ApiError {
    fn from(err: QueueServiceError) -> Self {
        match err {
            QueueServiceError::Queue(e) => e.into(),
            QueueServiceError::NegativeInput(n) => ApiError::BadRequest(format!("offset/position/limit must be non-negative, got {n}")),
        }
    }
}

impl From<ActivityServiceError> for ApiError {
    fn from(err: ActivityServiceError) -> Self {
        match err {
            ActivityServiceError::Repository(e) => e.into(),
            ActivityServiceError::InvalidEvent(e) => e.into(),
        }
    }
}

impl From<EventParseError> for ApiError {
    fn from(err: EventParseError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::Forbidden => ApiError::Forbidden,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        ApiError::Unauthorized
    }
}

/// Blanket conversion so handlers can `?` straight out of
/// `owner_or_admin_indirect` regardless of the lookup error's concrete type
/// (spec.md §4.5 mode 2).
impl<E> From<IndirectAuthError<E>> for ApiError
where
    E: Into<ApiError>,
{
    fn from(err: IndirectAuthError<E>) -> Self {
        match err {
            IndirectAuthError::Auth(e) => e.into(),
            IndirectAuthError::Lookup(e) => e.into(),
        }
    }
}
