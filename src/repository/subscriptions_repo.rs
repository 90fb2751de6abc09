use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::subscription::Subscription;
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbSubscription {
    subscriber_id: i32,
    artist_id: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<DbSubscription> for Subscription {
    type Error = RepositoryError;

    fn try_from(row: DbSubscription) -> Result<Self, Self::Error> {
        Ok(Subscription::new(row.subscriber_id, row.artist_id, row.created_at)?)
    }
}

pub struct PgSubscriptionsRepository;

impl PgSubscriptionsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(&self, pool: &PgPool, subscriber_id: i32, artist_id: i32) -> Result<Subscription, RepositoryError> {
        let users = super::PgUsersRepository::new();
        if !users.exists(pool, subscriber_id).await? {
            return Err(RepositoryError::not_found(EntityKind::User, subscriber_id));
        }
        if !users.exists(pool, artist_id).await? {
            return Err(RepositoryError::not_found(EntityKind::User, artist_id));
        }
        if self.exists(pool, subscriber_id, artist_id).await? {
            return Err(RepositoryError::already_exists(EntityKind::Subscription, format!("{subscriber_id}:{artist_id}")));
        }

        let row = sqlx::query_as::<_, DbSubscription>(
            "INSERT INTO subscriptions (subscriber_id, artist_id, created_at) VALUES ($1, $2, now())
             RETURNING subscriber_id, artist_id, created_at",
        )
        .bind(subscriber_id)
        .bind(artist_id)
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn exists(&self, pool: &PgPool, subscriber_id: i32, artist_id: i32) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM subscriptions WHERE subscriber_id = $1 AND artist_id = $2")
            .bind(subscriber_id)
            .bind(artist_id)
            .fetch_optional(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.is_some())
    }

    pub async fn delete(&self, pool: &PgPool, subscriber_id: i32, artist_id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND artist_id = $2")
            .bind(subscriber_id)
            .bind(artist_id)
            .execute(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::Subscription, format!("{subscriber_id}:{artist_id}")));
        }
        Ok(())
    }

    pub async fn list_subscriptions(&self, pool: &PgPool, subscriber_id: i32, skip: i64, limit: i64) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT subscriber_id, artist_id, created_at FROM subscriptions WHERE subscriber_id = $1
             ORDER BY created_at DESC OFFSET $2 LIMIT $3",
        )
        .bind(subscriber_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn list_subscribers(&self, pool: &PgPool, artist_id: i32, skip: i64, limit: i64) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT subscriber_id, artist_id, created_at FROM subscriptions WHERE artist_id = $1
             ORDER BY created_at DESC OFFSET $2 LIMIT $3",
        )
        .bind(artist_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn subscriber_count(&self, pool: &PgPool, artist_id: i32) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT count(*) FROM subscriptions WHERE artist_id = $1")
            .bind(artist_id)
            .fetch_one(pool)
            .await
            .map_err(RepositoryError::from_sqlx_error)?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_rejects_self_subscription(pool: PgPool) {
        super::super::test_helpers::migrate(&pool).await.unwrap();
        let users = super::super::PgUsersRepository::new();
        let user = users
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

        let repo = PgSubscriptionsRepository::new();
        // subscriber_id == artist_id is rejected one layer up in
        // services::account (domain::Subscription::new), not here — the
        // repository only enforces referential existence and uniqueness.
        let err = repo.create(&pool, user.id(), 999).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: EntityKind::User, .. }));
    }
}
