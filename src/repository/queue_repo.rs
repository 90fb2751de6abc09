//! Per-user track queue (spec.md §4.3, C3). Atomicity for `insert`, `move`,
//! and `remove` is provided by server-side Lua scripts
//! (`scripts/queue_{insert,move,remove}.lua`), grounded in
//! `original_source/backend/repositories/track_queue.py`'s `evalsha`-based
//! design and spec.md §9's matching design note — a naive read-modify-write
//! is explicitly called out there as unacceptable.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError, Script};

use super::{EntityKind, RepositoryError};

const INSERT_SCRIPT: &str = include_str!("../../scripts/queue_insert.lua");
const MOVE_SCRIPT: &str = include_str!("../../scripts/queue_move.lua");
const REMOVE_SCRIPT: &str = include_str!("../../scripts/queue_remove.lua");

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue for this user was not found")]
    NotFound,

    #[error(transparent)]
    Redis(#[from] RedisError),
}

impl From<QueueError> for RepositoryError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NotFound => RepositoryError::not_found(EntityKind::Queue, "<user>"),
            QueueError::Redis(e) => RepositoryError::ConnectionError(e.to_string()),
        }
    }
}

fn classify(err: RedisError) -> QueueError {
    if err.to_string().contains("QueueNotFound") {
        QueueError::NotFound
    } else {
        QueueError::Redis(err)
    }
}

#[derive(Clone)]
pub struct RedisQueueRepository {
    manager: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisQueueRepository {
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> Result<Self, QueueError> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager, ttl_seconds })
    }

    fn key(user_id: i32) -> String {
        format!("queue:{user_id}")
    }

    pub async fn push_left(&self, user_id: i32, track_id: i32) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        let key = Self::key(user_id);
        conn.lpush::<_, _, ()>(&key, track_id).await?;
        conn.expire::<_, ()>(&key, self.ttl_seconds as i64).await?;
        Ok(())
    }

    pub async fn push_right(&self, user_id: i32, track_id: i32) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        let key = Self::key(user_id);
        conn.rpush::<_, _, ()>(&key, track_id).await?;
        conn.expire::<_, ()>(&key, self.ttl_seconds as i64).await?;
        Ok(())
    }

    /// Reads `[offset, offset+limit-1]`; `limit == 0` means "to end"
    /// (spec.md §4.3 "list"). Refreshes the TTL on read.
    pub async fn list(&self, user_id: i32, offset: i64, limit: i64) -> Result<Vec<i32>, QueueError> {
        let mut conn = self.manager.clone();
        let key = Self::key(user_id);

        let stop = if limit == 0 { -1 } else { offset + limit - 1 };
        let raw: Vec<i32> = conn.lrange(&key, offset, stop).await?;

        if raw.is_empty() {
            return Err(QueueError::NotFound);
        }

        conn.expire::<_, ()>(&key, self.ttl_seconds as i64).await?;
        Ok(raw)
    }

    pub async fn delete(&self, user_id: i32) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.del(Self::key(user_id)).await?;
        if removed == 0 {
            return Err(QueueError::NotFound);
        }
        Ok(())
    }

    pub async fn insert(&self, user_id: i32, track_id: i32, position: i64) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        Script::new(INSERT_SCRIPT)
            .key(Self::key(user_id))
            .arg(track_id)
            .arg(position)
            .arg(self.ttl_seconds)
            .invoke_async::<()>(&mut conn)
            .await
            .map_err(classify)
    }

    pub async fn move_track(&self, user_id: i32, src: i64, dest: i64) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        Script::new(MOVE_SCRIPT)
            .key(Self::key(user_id))
            .arg(src)
            .arg(dest)
            .arg(self.ttl_seconds)
            .invoke_async::<()>(&mut conn)
            .await
            .map_err(classify)
    }

    pub async fn remove(&self, user_id: i32, position: i64) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();
        Script::new(REMOVE_SCRIPT)
            .key(Self::key(user_id))
            .arg(position)
            .arg(self.ttl_seconds)
            .invoke_async::<()>(&mut conn)
            .await
            .map_err(classify)
    }
}

/// Mirrors `scripts/queue_move.lua`'s index algebra in pure Rust so it has a
/// test anchor outside of a live Redis instance. `dest` is an index into the
/// list *after* `src` has already been removed (spec.md §4.3 "move"); it is
/// clamped to `[0, vals.len()]` with no further adjustment — `vals.len()` is
/// already one shorter than the pre-removal list, so no extra shift for the
/// vacated slot is needed.
#[cfg(test)]
fn move_element<T>(vals: &mut Vec<T>, src: i64, dest: i64) {
    let n = vals.len();
    let src = src.clamp(0, n as i64 - 1) as usize;
    let item = vals.remove(src);

    let dest = dest.clamp(0, vals.len() as i64) as usize;
    vals.insert(dest, item);
}

#[cfg(test)]
mod tests {
    use super::move_element;

    /// spec.md §8 P3 / scenario 3, the exact sequence the review flagged:
    /// `move(src=0, dest=3)` against `[103,104,101,102]` must yield
    /// `[104,101,102,103]`, not `[104,101,103,102]`.
    #[test]
    fn move_matches_spec_worked_example() {
        let mut vals = vec![103, 104, 101, 102];
        move_element(&mut vals, 0, 3);
        assert_eq!(vals, vec![104, 101, 102, 103]);
    }

    #[test]
    fn move_to_front() {
        let mut vals = vec!["a", "b", "c"];
        move_element(&mut vals, 2, 0);
        assert_eq!(vals, vec!["c", "a", "b"]);
    }

    #[test]
    fn move_one_step_right() {
        let mut vals = vec!["a", "b", "c"];
        move_element(&mut vals, 0, 1);
        assert_eq!(vals, vec!["b", "a", "c"]);
    }

    #[test]
    fn move_clamps_out_of_range_src_and_dest() {
        let mut vals = vec!["a", "b", "c"];
        move_element(&mut vals, 99, 99);
        assert_eq!(vals, vec!["a", "b", "c"]);
    }

    #[test]
    fn move_is_noop_on_single_element() {
        let mut vals = vec!["only"];
        move_element(&mut vals, 0, 0);
        assert_eq!(vals, vec!["only"]);
    }
}
