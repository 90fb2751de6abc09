use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::domain::album::{Album, AlbumUpdate};
use crate::domain::{Pagination, SimilarityThreshold};
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbAlbum {
    id: i32,
    name: String,
    artist_id: i32,
    release_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbAlbum> for Album {
    type Error = RepositoryError;

    fn try_from(row: DbAlbum) -> Result<Self, Self::Error> {
        Ok(Album::new(row.id, row.name, row.artist_id, row.release_date, row.created_at, row.updated_at)?)
    }
}

pub struct NewAlbum {
    pub name: String,
    pub artist_id: i32,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct AlbumSearch {
    pub name: Option<String>,
    pub artist_id: Option<i32>,
    pub threshold: SimilarityThreshold,
    pub release_search_start: Option<NaiveDate>,
    pub release_search_end: Option<NaiveDate>,
    pub created_search_start: Option<DateTime<Utc>>,
    pub created_search_end: Option<DateTime<Utc>>,
    pub updated_search_start: Option<DateTime<Utc>>,
    pub updated_search_end: Option<DateTime<Utc>>,
}

pub struct PgAlbumsRepository;

impl PgAlbumsRepository {
    pub fn new() -> Self {
        Self
    }

    /// Verifies `artist_id` exists before inserting (spec.md §4.2
    /// "Referential validation on create/update").
    pub async fn create(&self, pool: &PgPool, new_album: NewAlbum) -> Result<Album, RepositoryError> {
        if !super::PgUsersRepository::new().exists(pool, new_album.artist_id).await? {
            return Err(RepositoryError::not_found(EntityKind::User, new_album.artist_id));
        }

        let row = sqlx::query_as::<_, DbAlbum>(
            "INSERT INTO albums (name, artist_id, release_date, created_at, updated_at)
             VALUES ($1, $2, $3, now(), now())
             RETURNING id, name, artist_id, release_date, created_at, updated_at",
        )
        .bind(&new_album.name)
        .bind(new_album.artist_id)
        .bind(new_album.release_date)
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn get_by_id(&self, pool: &PgPool, id: i32) -> Result<Album, RepositoryError> {
        let row = sqlx::query_as::<_, DbAlbum>(
            "SELECT id, name, artist_id, release_date, created_at, updated_at FROM albums WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Album, id))?;

        row.try_into()
    }

    pub async fn exists(&self, pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM albums WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    pub async fn search(&self, pool: &PgPool, filter: &AlbumSearch, pagination: &Pagination) -> Result<Vec<Album>, RepositoryError> {
        if let Some(artist_id) = filter.artist_id {
            if !super::PgUsersRepository::new().exists(pool, artist_id).await? {
                return Err(RepositoryError::not_found(EntityKind::User, artist_id));
            }
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, artist_id, release_date, created_at, updated_at FROM albums WHERE 1=1",
        );

        if let Some(artist_id) = filter.artist_id {
            qb.push(" AND artist_id = ").push_bind(artist_id);
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

        let rows = qb.build_query_as::<DbAlbum>().fetch_all(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn update(&self, pool: &PgPool, id: i32, update: AlbumUpdate) -> Result<Album, RepositoryError> {
        let current = self.get_by_id(pool, id).await?;
        let name = update.name.unwrap_or_else(|| current.name().to_string());
        let release_date = update.release_date.unwrap_or(current.release_date());

        let row = sqlx::query_as::<_, DbAlbum>(
            "UPDATE albums SET name = $1, release_date = $2, updated_at = now() WHERE id = $3
             RETURNING id, name, artist_id, release_date, created_at, updated_at",
        )
        .bind(&name)
        .bind(release_date)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Album, id))?;

        row.try_into()
    }

    /// Deletes the album row (the caller, `services::music`, is
    /// responsible for deleting its tracks and cover image first — spec.md
    /// §4.6 "Delete album").
    pub async fn delete(&self, pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::Album, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_rejects_missing_artist(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgAlbumsRepository::new();
        let err = repo
            .create(&pool, NewAlbum { name: "Kid A".into(), artist_id: 404, release_date: None })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: EntityKind::User, .. }));
    }
}
