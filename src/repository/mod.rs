pub mod activity_repo;
pub mod albums_repo;
pub mod blob_repo;
pub mod genres_repo;
pub mod playlist_tracks_repo;
pub mod playlists_repo;
pub mod queue_repo;
pub mod subscriptions_repo;
pub mod tracks_repo;
pub mod users_repo;

pub use activity_repo::PgActivityRepository;
pub use albums_repo::PgAlbumsRepository;
pub use blob_repo::S3BlobRepository;
pub use genres_repo::PgGenresRepository;
pub use playlist_tracks_repo::PgPlaylistTracksRepository;
pub use playlists_repo::PgPlaylistsRepository;
pub use queue_repo::RedisQueueRepository;
pub use subscriptions_repo::PgSubscriptionsRepository;
pub use tracks_repo::PgTracksRepository;
pub use users_repo::PgUsersRepository;

use std::fmt;

use crate::domain::ValidationError;

/// Every entity the repository layer can fail to find or collide on
/// (spec.md §7 error taxonomy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Album,
    Track,
    Genre,
    Playlist,
    PlaylistTrack,
    Subscription,
    MusicFile,
    ImageFile,
    Queue,
    UserActivity,
    Event,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::User => "User",
            EntityKind::Album => "Album",
            EntityKind::Track => "Track",
            EntityKind::Genre => "Genre",
            EntityKind::Playlist => "Playlist",
            EntityKind::PlaylistTrack => "PlaylistTrack",
            EntityKind::Subscription => "Subscription",
            EntityKind::MusicFile => "MusicFile",
            EntityKind::ImageFile => "ImageFile",
            EntityKind::Queue => "Queue",
            EntityKind::UserActivity => "UserActivity",
            EntityKind::Event => "Event",
        };
        f.write_str(s)
    }
}

/// Domain-level repository failures, following the teacher's
/// `RepositoryError` shape (`examples/Ocean50ul-home-server/src/repository/mod.rs`):
/// typed variants with `#[from]` wrapping the underlying library error, plus
/// a classifier (`from_sqlx_error`) that distinguishes not-found /
/// constraint-violation / connection-fatal from the raw backend error —
/// adapted here from SQLite error codes to PostgreSQL SQLSTATE codes.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{kind} with id {id} was not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} with key '{key}' already exists")]
    AlreadyExists { kind: EntityKind, key: String },

    #[error("A constraint was violated: {description}")]
    ConstraintViolation { description: String },

    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Failed to decode a database row: {0}")]
    RowDecodingError(String),

    #[error("Entity fields failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    GenericDatabaseError(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Classifies a raw `sqlx::Error` the way the teacher's
    /// `from_sqlx_error` does, but against PostgreSQL SQLSTATE codes
    /// (`23505` unique violation, `23503` foreign key violation) instead of
    /// SQLite's numeric result codes.
    pub fn from_sqlx_error(sqlx_error: sqlx::Error) -> Self {
        match &sqlx_error {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                Self::ConnectionError(sqlx_error.to_string())
            }
            sqlx::Error::Decode(decode_err) => Self::RowDecodingError(decode_err.to_string()),
            sqlx::Error::Database(db_error) => {
                if let Some(code) = db_error.code() {
                    if matches!(code.as_ref(), "23505" | "23503") {
                        return Self::ConstraintViolation { description: db_error.message().to_string() };
                    }
                }
                Self::GenericDatabaseError(sqlx_error)
            }
            _ => Self::GenericDatabaseError(sqlx_error),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    pub fn already_exists(kind: EntityKind, key: impl fmt::Display) -> Self {
        Self::AlreadyExists { kind, key: key.to_string() }
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use sqlx::PgPool;

    /// Mirrors the teacher's `prepare_db()` test helper
    /// (`repository::test_helpers::prepare_db`), but points at a disposable
    /// Postgres database instead of `sqlite::memory:` — trigram search
    /// (`pg_trgm`) has no SQLite equivalent, so `#[sqlx::test]` (which
    /// provisions and migrates a scratch database per test) replaces manual
    /// pool construction wherever a test needs it.
    pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }
}
