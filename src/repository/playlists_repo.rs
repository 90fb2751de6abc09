use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::domain::playlist::{Playlist, PlaylistUpdate};
use crate::domain::{Pagination, SimilarityThreshold};
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbPlaylist {
    id: i32,
    author_id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbPlaylist> for Playlist {
    type Error = RepositoryError;

    fn try_from(row: DbPlaylist) -> Result<Self, Self::Error> {
        Ok(Playlist::new(row.id, row.author_id, row.name, row.created_at, row.updated_at)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistSearch {
    pub name: Option<String>,
    pub author_id: Option<i32>,
    pub threshold: SimilarityThreshold,
    pub created_search_start: Option<DateTime<Utc>>,
    pub created_search_end: Option<DateTime<Utc>>,
    pub updated_search_start: Option<DateTime<Utc>>,
    pub updated_search_end: Option<DateTime<Utc>>,
}

pub struct PgPlaylistsRepository;

impl PgPlaylistsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(&self, pool: &PgPool, author_id: i32, name: &str) -> Result<Playlist, RepositoryError> {
        if !super::PgUsersRepository::new().exists(pool, author_id).await? {
            return Err(RepositoryError::not_found(EntityKind::User, author_id));
        }

        let row = sqlx::query_as::<_, DbPlaylist>(
            "INSERT INTO playlists (author_id, name, created_at, updated_at) VALUES ($1, $2, now(), now())
             RETURNING id, author_id, name, created_at, updated_at",
        )
        .bind(author_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn get_by_id(&self, pool: &PgPool, id: i32) -> Result<Playlist, RepositoryError> {
        let row = sqlx::query_as::<_, DbPlaylist>(
            "SELECT id, author_id, name, created_at, updated_at FROM playlists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Playlist, id))?;

        row.try_into()
    }

    pub async fn exists(&self, pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    /// Lists a user's playlists with a high limit (spec.md §4.7 "Delete
    /// user", step 1).
    pub async fn list_by_author(&self, pool: &PgPool, author_id: i32, limit: i64) -> Result<Vec<Playlist>, RepositoryError> {
        let rows = sqlx::query_as::<_, DbPlaylist>(
            "SELECT id, author_id, name, created_at, updated_at FROM playlists WHERE author_id = $1 ORDER BY id ASC LIMIT $2",
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn search(&self, pool: &PgPool, filter: &PlaylistSearch, pagination: &Pagination) -> Result<Vec<Playlist>, RepositoryError> {
        if let Some(author_id) = filter.author_id {
            if !super::PgUsersRepository::new().exists(pool, author_id).await? {
                return Err(RepositoryError::not_found(EntityKind::User, author_id));
            }
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, author_id, name, created_at, updated_at FROM playlists WHERE 1=1",
        );

        if let Some(author_id) = filter.author_id {
            qb.push(" AND author_id = ").push_bind(author_id);
        }
        if let Some(name) = &filter.name {
            qb.push(" AND similarity(name, ").push_bind(name.clone()).push(") >= ").push_bind(filter.threshold.value());
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

        let rows = qb.build_query_as::<DbPlaylist>().fetch_all(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn update(&self, pool: &PgPool, id: i32, update: PlaylistUpdate) -> Result<Playlist, RepositoryError> {
        let current = self.get_by_id(pool, id).await?;
        let name = update.name.unwrap_or_else(|| current.name().to_string());

        let row = sqlx::query_as::<_, DbPlaylist>(
            "UPDATE playlists SET name = $1, updated_at = now() WHERE id = $2
             RETURNING id, author_id, name, created_at, updated_at",
        )
        .bind(&name)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Playlist, id))?;

        row.try_into()
    }

    /// Deletes the playlist row; its `playlist_tracks` membership CASCADEs
    /// (spec.md §6).
    pub async fn delete(&self, pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::Playlist, id));
        }
        Ok(())
    }
}
