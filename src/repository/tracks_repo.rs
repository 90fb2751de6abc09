use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::domain::track::{Track, TrackUpdate};
use crate::domain::{Pagination, SimilarityThreshold};
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbTrack {
    id: i32,
    name: String,
    album_id: i32,
    artist_id: i32,
    genre_id: Option<i32>,
    release_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbTrack> for Track {
    type Error = RepositoryError;

    fn try_from(row: DbTrack) -> Result<Self, Self::Error> {
        Ok(Track::new(
            row.id,
            row.name,
            row.album_id,
            row.artist_id,
            row.genre_id,
            row.release_date,
            row.created_at,
            row.updated_at,
        )?)
    }
}

pub struct NewTrack {
    pub name: String,
    pub album_id: i32,
    pub artist_id: i32,
    pub genre_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TrackSearch {
    pub name: Option<String>,
    pub album_id: Option<i32>,
    pub artist_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub threshold: SimilarityThreshold,
    pub release_search_start: Option<NaiveDate>,
    pub release_search_end: Option<NaiveDate>,
    pub created_search_start: Option<DateTime<Utc>>,
    pub created_search_end: Option<DateTime<Utc>>,
    pub updated_search_start: Option<DateTime<Utc>>,
    pub updated_search_end: Option<DateTime<Utc>>,
}

pub struct PgTracksRepository;

const TRACK_COLUMNS: &str = "id, name, album_id, artist_id, genre_id, release_date, created_at, updated_at";

impl PgTracksRepository {
    pub fn new() -> Self {
        Self
    }

    /// Verifies `album_id`, `artist_id`, and (if set) `genre_id` exist
    /// before inserting (spec.md §4.2 "Referential validation").
    async fn validate_references(&self, pool: &PgPool, album_id: i32, artist_id: i32, genre_id: Option<i32>) -> Result<(), RepositoryError> {
        if !super::PgAlbumsRepository::new().exists(pool, album_id).await? {
            return Err(RepositoryError::not_found(EntityKind::Album, album_id));
        }
        if !super::PgUsersRepository::new().exists(pool, artist_id).await? {
            return Err(RepositoryError::not_found(EntityKind::User, artist_id));
        }
        if let Some(genre_id) = genre_id {
            if !super::PgGenresRepository::new().exists(pool, genre_id).await? {
                return Err(RepositoryError::not_found(EntityKind::Genre, genre_id));
            }
        }
        Ok(())
    }

    pub async fn create(&self, pool: &PgPool, new_track: NewTrack) -> Result<Track, RepositoryError> {
        self.validate_references(pool, new_track.album_id, new_track.artist_id, new_track.genre_id).await?;

        let row = sqlx::query_as::<_, DbTrack>(&format!(
            "INSERT INTO tracks (name, album_id, artist_id, genre_id, release_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, now(), now())
             RETURNING {TRACK_COLUMNS}"
        ))
        .bind(&new_track.name)
        .bind(new_track.album_id)
        .bind(new_track.artist_id)
        .bind(new_track.genre_id)
        .bind(new_track.release_date)
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn get_by_id(&self, pool: &PgPool, id: i32) -> Result<Track, RepositoryError> {
        let row = sqlx::query_as::<_, DbTrack>(&format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Track, id))?;

        row.try_into()
    }

    pub async fn exists(&self, pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM tracks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    /// Lists every track under an album with a high limit (spec.md §4.6
    /// "Delete album": "List all tracks under the album with a high
    /// limit").
    pub async fn list_by_album(&self, pool: &PgPool, album_id: i32, limit: i64) -> Result<Vec<Track>, RepositoryError> {
        let rows = sqlx::query_as::<_, DbTrack>(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE album_id = $1 ORDER BY id ASC LIMIT $2"
        ))
        .bind(album_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn count_by_album(&self, pool: &PgPool, album_id: i32) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT count(*) FROM tracks WHERE album_id = $1")
            .bind(album_id)
            .fetch_one(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.0)
    }

    pub async fn search(&self, pool: &PgPool, filter: &TrackSearch, pagination: &Pagination) -> Result<Vec<Track>, RepositoryError> {
        if let Some(album_id) = filter.album_id {
            if !super::PgAlbumsRepository::new().exists(pool, album_id).await? {
                return Err(RepositoryError::not_found(EntityKind::Album, album_id));
            }
        }
        if let Some(artist_id) = filter.artist_id {
            if !super::PgUsersRepository::new().exists(pool, artist_id).await? {
                return Err(RepositoryError::not_found(EntityKind::User, artist_id));
            }
        }
        if let Some(genre_id) = filter.genre_id {
            if !super::PgGenresRepository::new().exists(pool, genre_id).await? {
                return Err(RepositoryError::not_found(EntityKind::Genre, genre_id));
            }
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE 1=1"));

        if let Some(album_id) = filter.album_id {
            qb.push(" AND album_id = ").push_bind(album_id);
        }
        if let Some(artist_id) = filter.artist_id {
            qb.push(" AND artist_id = ").push_bind(artist_id);
        }
        if let Some(genre_id) = filter.genre_id {
            qb.push(" AND genre_id = ").push_bind(genre_id);
        }
        if let Some(name) = &filter.name {
            qb.push(" AND similarity(name, ").push_bind(name.clone()).push(") >= ").push_bind(filter.threshold.value());
        }
        if let Some(start) = filter.release_search_start {
            qb.push(" AND release_date >= ").push_bind(start);
        }
        if let Some(end) = filter.release_search_end {
            qb.push(" AND release_date <= ").push_bind(end);
        }
        if let Some(start) = filter.created_search_start {
            qb.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = filter.created_search_end {
            qb.push(" AND created_at <= ").push_bind(end);
        }
        if let Some(start) = filter.updated_search_start {
            qb.push(" AND updated_at >= ").push_bind(start);
        }
        if let Some(end) = filter.updated_search_end {
            qb.push(" AND updated_at <= ").push_bind(end);
        }

        if let Some(name) = &filter.name {
            qb.push(" ORDER BY similarity(name, ").push_bind(name.clone()).push(") DESC");
        } else {
            qb.push(" ORDER BY id ASC");
        }
        qb.push(" OFFSET ").push_bind(pagination.skip).push(" LIMIT ").push_bind(pagination.limit);

        let rows = qb.build_query_as::<DbTrack>().fetch_all(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn update(&self, pool: &PgPool, id: i32, update: TrackUpdate) -> Result<Track, RepositoryError> {
        let current = self.get_by_id(pool, id).await?;
        let album_id = update.album_id.unwrap_or_else(|| current.album_id());
        let genre_id = update.genre_id.unwrap_or_else(|| current.genre_id());

        self.validate_references(pool, album_id, current.artist_id(), genre_id).await?;

        let name = update.name.unwrap_or_else(|| current.name().to_string());
        let release_date = update.release_date.unwrap_or(current.release_date());

        let row = sqlx::query_as::<_, DbTrack>(&format!(
            "UPDATE tracks SET name = $1, album_id = $2, genre_id = $3, release_date = $4, updated_at = now()
             WHERE id = $5
             RETURNING {TRACK_COLUMNS}"
        ))
        .bind(&name)
        .bind(album_id)
        .bind(genre_id)
        .bind(release_date)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Track, id))?;

        row.try_into()
    }

    /// Deletes the track row; `playlist_tracks` membership CASCADEs (spec.md
    /// §6). Album reaping and blob deletion are orchestrated by
    /// `services::music::delete_track`, not here.
    pub async fn delete(&self, pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::Track, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_rejects_missing_album(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let users = super::super::PgUsersRepository::new();
        let artist = users
            .create(
                &pool,
                super::super::users_repo::NewUser {
                    name: "Thom".into(),
                    description: None,
                    username: "thom".into(),
                    password_hash: "hash".into(),
                    role: crate::domain::Role::User,
                },
            )
            .await
            .unwrap();

        let repo = PgTracksRepository::new();
        let err = repo
            .create(
                &pool,
                NewTrack { name: "Idioteque".into(), album_id: 404, artist_id: artist.id(), genre_id: None, release_date: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: EntityKind::Album, .. }));
    }
}
