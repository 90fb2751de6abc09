use chrono::{DateTime, NaiveDate, Utc};

use super::ValidationError;

/// An Album owned by a User (the *artist*, spec.md GLOSSARY). A *single* is
/// an Album containing exactly one Track, created atomically with it
/// (`services::music::create_single`) — there is no separate type for it.
#[derive(Clone, Debug)]
pub struct Album {
    id: i32,
    name: String,
    artist_id: i32,
    release_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AsRef<Album> for Album {
    fn as_ref(&self) -> &Album {
        self
    }
}

impl Album {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        artist_id: i32,
        release_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::NameIsEmptyString);
        }
        Ok(Self { id, name, artist_id, release_date, created_at, updated_at })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artist_id(&self) -> i32 {
        self.artist_id
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
}

impl crate::auth::authorize::OwnedResource for Album {
    fn owner_id(&self) -> i32 {
        self.artist_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlbumUpdate {
    pub name: Option<String>,
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
        let err = Album::new(1, "", 9, None, now(), now()).unwrap_err();
        assert!(matches!(err, ValidationError::NameIsEmptyString));
    }

    #[test]
    fn owner_is_artist() {
        use crate::auth::authorize::OwnedResource;
        let album = Album::new(1, "Kid A", 9, None, now(), now()).unwrap();
        assert_eq!(album.owner_id(), 9);
    }
}
