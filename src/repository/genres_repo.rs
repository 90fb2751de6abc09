use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::domain::genre::{Genre, GenreUpdate};
use crate::domain::{Pagination, SimilarityThreshold};
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbGenre {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbGenre> for Genre {
    type Error = RepositoryError;

    fn try_from(row: DbGenre) -> Result<Self, Self::Error> {
        Ok(Genre::new(row.id, row.name, row.created_at, row.updated_at)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenreSearch {
    pub name: Option<String>,
    pub threshold: SimilarityThreshold,
    pub created_search_start: Option<DateTime<Utc>>,
    pub created_search_end: Option<DateTime<Utc>>,
    pub updated_search_start: Option<DateTime<Utc>>,
    pub updated_search_end: Option<DateTime<Utc>>,
}

pub struct PgGenresRepository;

impl PgGenresRepository {
    pub fn new() -> Self {
        Self
    }

    /// Pre-checks `name` uniqueness before insert (spec.md §4.2
    /// "Uniqueness guards" — `GenreNameAlreadyExists`); name is unique and
    /// case-sensitive (spec.md §3).
    pub async fn create(&self, pool: &PgPool, name: &str) -> Result<Genre, RepositoryError> {
        if self.get_by_name(pool, name).await?.is_some() {
            return Err(RepositoryError::already_exists(EntityKind::Genre, name));
        }

        let row = sqlx::query_as::<_, DbGenre>(
            "INSERT INTO genres (name, created_at, updated_at) VALUES ($1, now(), now())
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn get_by_id(&self, pool: &PgPool, id: i32) -> Result<Genre, RepositoryError> {
        let row = sqlx::query_as::<_, DbGenre>("SELECT id, name, created_at, updated_at FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Genre, id))?;

        row.try_into()
    }

    pub async fn get_by_name(&self, pool: &PgPool, name: &str) -> Result<Option<Genre>, RepositoryError> {
        let row = sqlx::query_as::<_, DbGenre>("SELECT id, name, created_at, updated_at FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn exists(&self, pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    pub async fn search(&self, pool: &PgPool, filter: &GenreSearch, pagination: &Pagination) -> Result<Vec<Genre>, RepositoryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT id, name, created_at, updated_at FROM genres WHERE 1=1");

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

        let rows = qb.build_query_as::<DbGenre>().fetch_all(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn update(&self, pool: &PgPool, id: i32, update: GenreUpdate) -> Result<Genre, RepositoryError> {
        if let Some(name) = &update.name {
            if let Some(existing) = self.get_by_name(pool, name).await? {
                if existing.id() != id {
                    return Err(RepositoryError::already_exists(EntityKind::Genre, name));
                }
            }
        }

        let current = self.get_by_id(pool, id).await?;
        let name = update.name.unwrap_or_else(|| current.name().to_string());

        let row = sqlx::query_as::<_, DbGenre>(
            "UPDATE genres SET name = $1, updated_at = now() WHERE id = $2
             RETURNING id, name, created_at, updated_at",
        )
        .bind(&name)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Genre, id))?;

        row.try_into()
    }

    /// Deleting a Genre does not cascade-delete Tracks: the FK is
    /// `ON DELETE SET NULL` (spec.md §6 "deleting genre SETs
    /// tracks.genre_id to NULL").
    pub async fn delete(&self, pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::Genre, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_rejects_duplicate_name(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgGenresRepository::new();
        repo.create(&pool, "Jazz").await.unwrap();
        let err = repo.create(&pool, "Jazz").await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
    }

    #[sqlx::test]
    async fn create_is_case_sensitive(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgGenresRepository::new();
        repo.create(&pool, "Jazz").await.unwrap();
        repo.create(&pool, "jazz").await.unwrap();
    }

    #[sqlx::test]
    async fn delete_missing_is_not_found(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgGenresRepository::new();
        let err = repo.delete(&pool, 1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: EntityKind::Genre, .. }));
    }
}
