use chrono::{DateTime, Utc};

/// Membership row: primary key is the `(playlist_id, track_id)` pair
/// (spec.md §3). Unlike the other entities there is no surrogate id and no
/// update — membership either exists or it doesn't.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaylistTrack {
    playlist_id: i32,
    track_id: i32,
    added_at: DateTime<Utc>,
}

impl PlaylistTrack {
    pub fn new(playlist_id: i32, track_id: i32, added_at: DateTime<Utc>) -> Self {
        Self { playlist_id, track_id, added_at }
    }

    pub fn playlist_id(&self) -> i32 {
        self.playlist_id
    }

    pub fn track_id(&self) -> i32 {
        self.track_id
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }
}
