use chrono::{DateTime, Utc};

use super::ValidationError;

/// `(subscriber_id, artist_id)` pair; a User follows another User acting as
/// an artist. Primary key is the pair (spec.md §3); `subscriber_id` must
/// differ from `artist_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    subscriber_id: i32,
    artist_id: i32,
    created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(subscriber_id: i32, artist_id: i32, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        if subscriber_id == artist_id {
            return Err(ValidationError::SelfSubscription(subscriber_id));
        }
        Ok(Self { subscriber_id, artist_id, created_at })
    }

    pub fn subscriber_id(&self) -> i32 {
        self.subscriber_id
    }

    pub fn artist_id(&self) -> i32 {
        self.artist_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_subscription() {
        let err = Subscription::new(5, 5, DateTime::from_timestamp(0, 0).unwrap()).unwrap_err();
        assert!(matches!(err, ValidationError::SelfSubscription(5)));
    }
}
