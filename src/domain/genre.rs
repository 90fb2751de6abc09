use chrono::{DateTime, Utc};

use super::ValidationError;

/// A musical genre. `name` is globally unique and case-sensitive (spec.md §3
/// — unlike Album/Track/Playlist names, which are not required to be unique).
#[derive(Clone, Debug)]
pub struct Genre {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AsRef<Genre> for Genre {
    fn as_ref(&self) -> &Genre {
        self
    }
}

impl Genre {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::NameIsEmptyString);
        }
        Ok(Self { id, name, created_at, updated_at })
    }

    pub fn id(&self) -> i32 {
        self.id
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

#[derive(Debug, Clone, Default)]
pub struct GenreUpdate {
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
        let err = Genre::new(1, "", now(), now()).unwrap_err();
        assert!(matches!(err, ValidationError::NameIsEmptyString));
    }

    #[test]
    fn accepts_distinct_case_names() {
        let jazz = Genre::new(1, "Jazz", now(), now()).unwrap();
        let jazz_lower = Genre::new(2, "jazz", now(), now()).unwrap();
        assert_ne!(jazz.name(), jazz_lower.name());
    }
}
