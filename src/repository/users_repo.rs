use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::domain::user::{User, UserUpdate};
use crate::domain::{Pagination, Role, SimilarityThreshold};
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbUser {
    id: i32,
    name: String,
    description: Option<String>,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = RepositoryError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        let role = Role::try_from(row.role.as_str())
            .map_err(|err| RepositoryError::RowDecodingError(err.to_string()))?;

        Ok(User::new(
            row.id,
            row.name,
            row.description,
            row.username,
            row.password_hash,
            role,
            row.created_at,
            row.updated_at,
        )?)
    }
}

/// Fields required to create a User; password is already bcrypt-hashed by
/// the time it reaches the repository (`auth::password::hash` runs in
/// `services::account`, not here).
pub struct NewUser {
    pub name: String,
    pub description: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Conjunctive search filter over users (spec.md §4.2 "Search semantics").
#[derive(Debug, Clone, Default)]
pub struct UserSearch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub threshold: SimilarityThreshold,
    pub created_search_start: Option<DateTime<Utc>>,
    pub created_search_end: Option<DateTime<Utc>>,
    pub updated_search_start: Option<DateTime<Utc>>,
    pub updated_search_end: Option<DateTime<Utc>>,
}

pub struct PgUsersRepository;

impl PgUsersRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(&self, pool: &PgPool, new_user: NewUser) -> Result<User, RepositoryError> {
        let existing = self.get_by_username(pool, &new_user.username).await?;
        if existing.is_some() {
            return Err(RepositoryError::already_exists(EntityKind::User, &new_user.username));
        }

        let row = sqlx::query_as::<_, DbUser>(
            "INSERT INTO users (name, description, username, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, now(), now())
             RETURNING id, name, description, username, password_hash, role, created_at, updated_at",
        )
        .bind(&new_user.name)
        .bind(&new_user.description)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn get_by_id(&self, pool: &PgPool, id: i32) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, DbUser>(
            "SELECT id, name, description, username, password_hash, role, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::User, id))?;

        row.try_into()
    }

    pub async fn get_by_username(&self, pool: &PgPool, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, DbUser>(
            "SELECT id, name, description, username, password_hash, role, created_at, updated_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn exists(&self, pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    pub async fn search(
        &self,
        pool: &PgPool,
        filter: &UserSearch,
        pagination: &Pagination,
    ) -> Result<Vec<User>, RepositoryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, description, username, password_hash, role, created_at, updated_at FROM users WHERE 1=1",
        );

        if let Some(username) = &filter.username {
            qb.push(" AND username = ").push_bind(username.clone());
        }
        if let Some(name) = &filter.name {
            qb.push(" AND similarity(name, ")
                .push_bind(name.clone())
                .push(") >= ")
                .push_bind(filter.threshold.value());
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

        let rows = qb.build_query_as::<DbUser>().fetch_all(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Field-level merge update (spec.md §9 "dynamic field-level update"
    /// redesign note): only `Some` fields in `update` are applied;
    /// `updated_at` is always regenerated.
    pub async fn update(&self, pool: &PgPool, id: i32, update: UserUpdate) -> Result<User, RepositoryError> {
        if let Some(username) = &update.username {
            if let Some(existing) = self.get_by_username(pool, username).await? {
                if existing.id() != id {
                    return Err(RepositoryError::already_exists(EntityKind::User, username));
                }
            }
        }

        let current = self.get_by_id(pool, id).await?;

        let name = update.name.unwrap_or_else(|| current.name().to_string());
        let description = update.description.unwrap_or_else(|| current.description().map(str::to_string));
        let username = update.username.unwrap_or_else(|| current.username().to_string());
        let password_hash = update.password_hash.unwrap_or_else(|| current.password_hash().to_string());
        let role = update.role.unwrap_or_else(|| current.role());

        let row = sqlx::query_as::<_, DbUser>(
            "UPDATE users SET name = $1, description = $2, username = $3, password_hash = $4, role = $5, updated_at = now()
             WHERE id = $6
             RETURNING id, name, description, username, password_hash, role, created_at, updated_at",
        )
        .bind(&name)
        .bind(&description)
        .bind(&username)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::User, id))?;

        row.try_into()
    }

    /// Deletes the user row. Albums, tracks, playlists, and subscriptions
    /// CASCADE via foreign keys (spec.md §6 "Persisted layout"); the blob
    /// cascade is orchestrated by `services::account::delete_user`, not
    /// here.
    pub async fn delete(&self, pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::User, id));
        }
        Ok(())
    }

    /// Whether any user currently holds `role` (spec.md §3 "Supplemented
    /// features": `/admin/bootstrap` refuses once an admin already exists).
    pub async fn any_with_role(&self, pool: &PgPool, role: Role) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE role = $1 LIMIT 1")
            .bind(role.as_str())
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_rejects_duplicate_username(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgUsersRepository::new();

        let make = || NewUser {
            name: "Thom".into(),
            description: None,
            username: "thom".into(),
            password_hash: "hash".into(),
            role: Role::User,
        };

        repo.create(&pool, make()).await.unwrap();
        let err = repo.create(&pool, make()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
    }

    #[sqlx::test]
    async fn get_by_id_missing_is_not_found(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgUsersRepository::new();
        let err = repo.get_by_id(&pool, 999).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: EntityKind::User, .. }));
    }

    #[sqlx::test]
    async fn update_only_applies_set_fields(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let repo = PgUsersRepository::new();
        let created = repo
            .create(
                &pool,
                NewUser {
                    name: "Thom".into(),
                    description: Some("singer".into()),
                    username: "thom".into(),
                    password_hash: "hash".into(),
                    role: Role::User,
                },
            )
            .await
            .unwrap();

        let updated = repo
            .update(&pool, created.id(), UserUpdate { name: Some("Thomas".into()), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(updated.name(), "Thomas");
        assert_eq!(updated.description(), Some("singer"));
        assert_eq!(updated.username(), "thom");
    }
}
