//! Activity Service (spec.md §4.4/§2 C10): thin orchestration over the
//! activity repository, including the analytics aggregation passthroughs.

use sqlx::PgPool;

use crate::domain::activity::{ActivityEvent, Event};
use crate::repository::activity_repo::{ActivityFilter, DailyActiveUsers, MostPlayedTrack, TrackCompletionRate};
use crate::repository::PgActivityRepository;

use super::ActivityServiceError;

pub struct ActivityService {
    activity: PgActivityRepository,
}

impl ActivityService {
    pub fn new() -> Self {
        Self { activity: PgActivityRepository::new() }
    }

    pub async fn add(&self, pool: &PgPool, user_id: i32, track_id: i32, event: &str) -> Result<ActivityEvent, ActivityServiceError> {
        let event = Event::try_from(event)?;
        Ok(self.activity.add(pool, user_id, track_id, event).await?)
    }

    pub async fn get(&self, pool: &PgPool, id: i64) -> Result<ActivityEvent, ActivityServiceError> {
        Ok(self.activity.get(pool, id).await?)
    }

    pub async fn list(&self, pool: &PgPool, filter: &ActivityFilter, offset: i64, limit: i64) -> Result<Vec<ActivityEvent>, ActivityServiceError> {
        Ok(self.activity.list(pool, filter, offset, limit).await?)
    }

    pub async fn delete(&self, pool: &PgPool, filter: &ActivityFilter) -> Result<u64, ActivityServiceError> {
        Ok(self.activity.delete(pool, filter).await?)
    }

    pub async fn most_played_tracks(&self, pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<MostPlayedTrack>, ActivityServiceError> {
        Ok(self.activity.most_played_tracks(pool, offset, limit).await?)
    }

    pub async fn daily_active_users(&self, pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<DailyActiveUsers>, ActivityServiceError> {
        Ok(self.activity.daily_active_users(pool, offset, limit).await?)
    }

    pub async fn tracks_completion_rate(&self, pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<TrackCompletionRate>, ActivityServiceError> {
        Ok(self.activity.tracks_completion_rate(pool, offset, limit).await?)
    }
}

impl Default for ActivityService {
    fn default() -> Self {
        Self::new()
    }
}
