pub mod account;
pub mod activity;
pub mod music;
pub mod queue;

pub use account::AccountService;
pub use activity::ActivityService;
pub use music::MusicService;
pub use queue::QueueService;

use crate::domain::ValidationError;
use crate::repository::blob_repo::BlobError;
use crate::repository::RepositoryError;

/// Errors the Music Service (C7) surfaces, following the teacher's layered
/// error shape (`examples/Ocean50ul-home-server/src/services/mod.rs`'s
/// `SyncServiceError`): a `#[from]` per lower layer plus variants the
/// service itself introduces.
#[derive(Debug, thiserror::Error)]
pub enum MusicServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("range start {start} is past the end of a {size}-byte file")]
    InvalidStart { start: u64, size: u64 },
}

/// Errors the Account Service (C8) surfaces.
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Password(#[from] crate::auth::password::PasswordError),

    #[error(transparent)]
    Music(#[from] MusicServiceError),

    /// Registration succeeded but the mandatory "fav" playlist could not be
    /// created (spec.md §4.7 "Registration side-effect": surfaced to the
    /// caller as an internal error; the user row is not rolled back).
    #[error("user was created but the default playlist could not be created: {0}")]
    FavPlaylistCreationFailed(RepositoryError),

    /// First-admin bootstrap refuses once any admin already exists
    /// (SPEC_FULL.md §3 "Supplemented features").
    #[error("an admin user already exists")]
    AdminAlreadyExists,
}

/// Errors the Queue Service (C9) surfaces.
#[derive(Debug, thiserror::Error)]
pub enum QueueServiceError {
    #[error(transparent)]
    Queue(#[from] crate::repository::queue_repo::QueueError),

    #[error("offset/position/limit must be non-negative, got {0}")]
    NegativeInput(i64),
}

/// Errors the Activity Service (C10) surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ActivityServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    InvalidEvent(#[from] crate::domain::activity::EventParseError),
}
