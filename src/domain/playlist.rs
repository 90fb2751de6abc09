use chrono::{DateTime, Utc};

use super::ValidationError;

/// A Playlist authored by a User. A playlist named "fav" is auto-created on
/// registration (spec.md §4.7 "registration side-effect") but is otherwise
/// an ordinary playlist — nothing distinguishes it at the type level.
#[derive(Clone, Debug)]
pub struct Playlist {
    id: i32,
    author_id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AsRef<Playlist> for Playlist {
    fn as_ref(&self) -> &Playlist {
        self
    }
}

impl Playlist {
    pub const FAV_NAME: &'static str = "fav";

    pub fn new(
        id: i32,
        author_id: i32,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::NameIsEmptyString);
        }
        Ok(Self { id, author_id, name, created_at, updated_at })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn author_id(&self) -> i32 {
        self.author_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl crate::auth::authorize::OwnedResource for Playlist {
    fn owner_id(&self) -> i32 {
        self.author_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistUpdate {
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn rejects_empty_name() {
        let err = Playlist::new(1, 9, "", now(), now()).unwrap_err();
        assert!(matches!(err, ValidationError::NameIsEmptyString));
    }

    #[test]
    fn fav_name_constant() {
        let playlist = Playlist::new(1, 9, Playlist::FAV_NAME, now(), now()).unwrap();
        assert_eq!(playlist.name(), "fav");
    }
}
