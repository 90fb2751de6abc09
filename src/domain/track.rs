use chrono::{DateTime, NaiveDate, Utc};

use super::ValidationError;

/// A Track belonging to an Album, attributed to an artist, with an optional
/// Genre. Tracks do not own a distinct cover image — `get_track_image`
/// (services::music) resolves `ImageTarget::Album(track.album_id())`
/// instead (spec.md §9 "track cover" open question).
#[derive(Clone, Debug)]
pub struct Track {
    id: i32,
    name: String,
    album_id: i32,
    artist_id: i32,
    genre_id: Option<i32>,
    release_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AsRef<Track> for Track {
    fn as_ref(&self) -> &Track {
        self
    }
}

impl Track {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i32,
        name: impl Into<String>,
        album_id: i32,
        artist_id: i32,
        genre_id: Option<i32>,
        release_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::NameIsEmptyString);
        }
        Ok(Self { id, name, album_id, artist_id, genre_id, release_date, created_at, updated_at })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn album_id(&self) -> i32 {
        self.album_id
    }

    pub fn artist_id(&self) -> i32 {
        self.artist_id
    }

    pub fn genre_id(&self) -> Option<i32> {
        self.genre_id
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Blob key of the audio object (spec.md §6 "Blob layout").
    pub fn blob_key(&self) -> String {
        format!("{}/{}", self.artist_id, self.id)
    }
}

impl crate::auth::authorize::OwnedResource for Track {
    fn owner_id(&self) -> i32 {
        self.artist_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackUpdate {
    pub name: Option<String>,
    pub album_id: Option<i32>,
    pub genre_id: Option<Option<i32>>,
    pub release_date: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn rejects_empty_name() {
        let err = Track::new(1, "", 1, 9, None, None, now(), now()).unwrap_err();
        assert!(matches!(err, ValidationError::NameIsEmptyString));
    }

    #[test]
    fn blob_key_is_artist_then_track() {
        let track = Track::new(42, "Idioteque", 1, 9, None, None, now(), now()).unwrap();
        assert_eq!(track.blob_key(), "9/42");
    }
}
