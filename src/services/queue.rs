//! Queue Service (spec.md §4.3/§2 C9): thin orchestration over the queue
//! repository plus input validation (non-negative offsets/positions).

use crate::repository::RedisQueueRepository;

use super::QueueServiceError;

fn non_negative(value: i64) -> Result<(), QueueServiceError> {
    if value < 0 {
        return Err(QueueServiceError::NegativeInput(value));
    }
    Ok(())
}

pub struct QueueService {
    queue: RedisQueueRepository,
}

impl QueueService {
    pub fn new(queue: RedisQueueRepository) -> Self {
        Self { queue }
    }

    pub async fn push_left(&self, user_id: i32, track_id: i32) -> Result<(), QueueServiceError> {
        Ok(self.queue.push_left(user_id, track_id).await?)
    }

    pub async fn push_right(&self, user_id: i32, track_id: i32) -> Result<(), QueueServiceError> {
        Ok(self.queue.push_right(user_id, track_id).await?)
    }

    pub async fn list(&self, user_id: i32, offset: i64, limit: i64) -> Result<Vec<i32>, QueueServiceError> {
        non_negative(offset)?;
        non_negative(limit)?;
        Ok(self.queue.list(user_id, offset, limit).await?)
    }

    pub async fn delete(&self, user_id: i32) -> Result<(), QueueServiceError> {
        Ok(self.queue.delete(user_id).await?)
    }

    pub async fn insert(&self, user_id: i32, track_id: i32, position: i64) -> Result<(), QueueServiceError> {
        non_negative(position)?;
        Ok(self.queue.insert(user_id, track_id, position).await?)
    }

    pub async fn move_track(&self, user_id: i32, src: i64, dest: i64) -> Result<(), QueueServiceError> {
        non_negative(src)?;
        non_negative(dest)?;
        Ok(self.queue.move_track(user_id, src, dest).await?)
    }

    pub async fn remove(&self, user_id: i32, position: i64) -> Result<(), QueueServiceError> {
        non_negative(position)?;
        Ok(self.queue.remove(user_id, position).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_offset() {
        assert!(matches!(non_negative(-1), Err(QueueServiceError::NegativeInput(-1))));
        assert!(non_negative(0).is_ok());
    }
}
