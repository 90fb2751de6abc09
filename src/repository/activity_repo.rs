use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::domain::activity::{ActivityEvent, Event};
use super::{EntityKind, RepositoryError};

#[derive(FromRow)]
struct DbActivityEvent {
    id: i64,
    user_id: i32,
    track_id: i32,
    event: String,
    time: DateTime<Utc>,
}

impl TryFrom<DbActivityEvent> for ActivityEvent {
    type Error = RepositoryError;

    fn try_from(row: DbActivityEvent) -> Result<Self, Self::Error> {
        let event = Event::try_from(row.event.as_str()).map_err(|err| RepositoryError::RowDecodingError(err.to_string()))?;
        Ok(ActivityEvent::new(row.id, row.user_id, row.track_id, event, row.time))
    }
}

/// Conjunctive filter over the activity log (spec.md §4.4).
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub ids: Vec<i64>,
    pub user_ids: Vec<i32>,
    pub track_ids: Vec<i32>,
    pub events: Vec<Event>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl ActivityFilter {
    fn apply(&self, qb: &mut QueryBuilder<Postgres>) {
        if !self.ids.is_empty() {
            qb.push(" AND id = ANY(").push_bind(self.ids.clone()).push(")");
        }
        if !self.user_ids.is_empty() {
            qb.push(" AND user_id = ANY(").push_bind(self.user_ids.clone()).push(")");
        }
        if !self.track_ids.is_empty() {
            qb.push(" AND track_id = ANY(").push_bind(self.track_ids.clone()).push(")");
        }
        if !self.events.is_empty() {
            let names: Vec<&'static str> = self.events.iter().map(Event::as_str).collect();
            qb.push(" AND event = ANY(").push_bind(names).push(")");
        }
        if let Some(start) = self.start_time {
            qb.push(" AND time >= ").push_bind(start);
        }
        if let Some(end) = self.end_time {
            qb.push(" AND time <= ").push_bind(end);
        }
    }
}

pub struct MostPlayedTrack {
    pub track_id: i32,
    pub play_count: i64,
}

pub struct DailyActiveUsers {
    pub day: chrono::NaiveDate,
    pub active_users: i64,
}

pub struct TrackCompletionRate {
    pub track_id: i32,
    pub completion_rate: f64,
}

pub struct PgActivityRepository;

impl PgActivityRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn add(&self, pool: &PgPool, user_id: i32, track_id: i32, event: Event) -> Result<ActivityEvent, RepositoryError> {
        let row = sqlx::query_as::<_, DbActivityEvent>(
            "INSERT INTO user_activity (user_id, track_id, event, time) VALUES ($1, $2, $3, now())
             RETURNING id, user_id, track_id, event, time",
        )
        .bind(user_id)
        .bind(track_id)
        .bind(event.as_str())
        .fetch_one(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        row.try_into()
    }

    pub async fn get(&self, pool: &PgPool, id: i64) -> Result<ActivityEvent, RepositoryError> {
        let row = sqlx::query_as::<_, DbActivityEvent>(
            "SELECT id, user_id, track_id, event, time FROM user_activity WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::UserActivity, id))?;

        row.try_into()
    }

    pub async fn list(&self, pool: &PgPool, filter: &ActivityFilter, offset: i64, limit: i64) -> Result<Vec<ActivityEvent>, RepositoryError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, user_id, track_id, event, time FROM user_activity WHERE 1=1");
        filter.apply(&mut qb);
        qb.push(" ORDER BY time DESC OFFSET ").push_bind(offset).push(" LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<DbActivityEvent>().fetch_all(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Deletes every row matching `filter`; raises `UserActivityNotFound`
    /// when nothing matched (spec.md §4.4).
    pub async fn delete(&self, pool: &PgPool, filter: &ActivityFilter) -> Result<u64, RepositoryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("DELETE FROM user_activity WHERE 1=1");
        filter.apply(&mut qb);

        let result = qb.build().execute(pool).await.map_err(RepositoryError::from_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(EntityKind::UserActivity, "<filter>"));
        }
        Ok(result.rows_affected())
    }

    pub async fn most_played_tracks(&self, pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<MostPlayedTrack>, RepositoryError> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT track_id, count(*) AS play_count FROM user_activity WHERE event = 'play'
             GROUP BY track_id ORDER BY play_count DESC OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        Ok(rows.into_iter().map(|(track_id, play_count)| MostPlayedTrack { track_id, play_count }).collect())
    }

    pub async fn daily_active_users(&self, pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<DailyActiveUsers>, RepositoryError> {
        let rows: Vec<(chrono::NaiveDate, i64)> = sqlx::query_as(
            "SELECT date(time) AS day, count(DISTINCT user_id) AS active_users FROM user_activity
             GROUP BY day ORDER BY day ASC OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        Ok(rows.into_iter().map(|(day, active_users)| DailyActiveUsers { day, active_users }).collect())
    }

    /// Per-track `skips / plays` (spec.md §4.4). Tracks with zero plays are
    /// excluded rather than dividing by zero.
    pub async fn tracks_completion_rate(&self, pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<TrackCompletionRate>, RepositoryError> {
        let rows: Vec<(i32, f64)> = sqlx::query_as(
            "SELECT track_id,
                    count(*) FILTER (WHERE event = 'skip')::float8 / count(*) FILTER (WHERE event = 'play')::float8 AS completion_rate
             FROM user_activity
             GROUP BY track_id
             HAVING count(*) FILTER (WHERE event = 'play') > 0
             ORDER BY track_id ASC OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(RepositoryError::from_sqlx_error)?;

        Ok(rows.into_iter().map(|(track_id, completion_rate)| TrackCompletionRate { track_id, completion_rate }).collect())
    }
}
