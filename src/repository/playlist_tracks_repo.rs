use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::playlist_track::PlaylistTrack;
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbPlaylistTrack {
    playlist_id: i32,
    track_id: i32,
    added_at: DateTime<Utc>,
}

impl From<DbPlaylistTrack> for PlaylistTrack {
    fn from(row: DbPlaylistTrack) -> Self {
        PlaylistTrack::new(row.playlist_id, row.track_id, row.added_at)
    }
}

pub struct PgPlaylistTracksRepository;

impl PgPlaylistTracksRepository {
    pub fn new() -> Self {
        Self
    }

    /// Adds a track to a playlist; both sides must already exist (spec.md
    /// §3 "PlaylistTrack"), and the pair is unique
    /// (`EntityKind::PlaylistTrack` AlreadyExists on a duplicate insert).
    pub async fn add(&self, pool: &PgPool, playlist_id: i32, track_id: i32) -> Result<PlaylistTrack, RepositoryError> {
        if !super::PgPlaylistsRepository::new().exists(pool, playlist_id).await? {
            return Err(RepositoryError::not_found(EntityKind::Playlist, playlist_id));
        }
        if !super::PgTracksRepository::new().exists(pool, track_id).await? {
            return Err(RepositoryError::not_found(EntityKind::Track, track_id));
        }
        if self.exists(pool, playlist_id, track_id).await? {
            return Err(RepositoryError::already_exists(EntityKind::PlaylistTrack, format!("{playlist_id}:{track_id}")));
        }

        let row = sqlx::query_as::<_, DbPlaylistTrack>(
            "INSERT INTO playlist_tracks (playlist_id, track_id, added_at) VALUES ($1, $2, now())
             RETURNING playlist_id, track_id, added_at",
        )
        .bind(playlist_id)
        .bind(track_id)
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        Ok(row.into())
    }

    pub async fn exists(&self, pool: &PgPool, playlist_id: i32, track_id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM playlist_tracks WHERE playlist_id = $1 AND track_id = $2")
            .bind(playlist_id)
            .bind(track_id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    pub async fn list_by_playlist(&self, pool: &PgPool, playlist_id: i32) -> Result<Vec<PlaylistTrack>, RepositoryError> {
        let rows = sqlx::query_as::<_, DbPlaylistTrack>(
            "SELECT playlist_id, track_id, added_at FROM playlist_tracks WHERE playlist_id = $1 ORDER BY added_at ASC",
        )
        .bind(playlist_id)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn remove(&self, pool: &PgPool, playlist_id: i32, track_id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = $1 AND track_id = $2")
            .bind(playlist_id)
            .bind(track_id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::PlaylistTrack, format!("{playlist_id}:{track_id}")));
        }
        Ok(())
    }
}
