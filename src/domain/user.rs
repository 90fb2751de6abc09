use chrono::{DateTime, Utc};

use super::{Role, ValidationError};

/// A registered account. Also the *artist* identity for albums/tracks it
/// owns (see GLOSSARY in spec.md). `password` is always a bcrypt hash —
/// nothing upstream of `auth::password` ever sees or stores plaintext.
#[derive(Clone, Debug)]
pub struct User {
    id: i32,
    name: String,
    description: Option<String>,
    username: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AsRef<User> for User {
    fn as_ref(&self) -> &User {
        self
    }
}

impl User {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i32,
        name: impl Into<String>,
        description: Option<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let username = username.into();

        if name.trim().is_empty() {
            return Err(ValidationError::NameIsEmptyString);
        }
        if username.trim().is_empty() {
            return Err(ValidationError::UsernameIsEmptyString);
        }

        Ok(Self {
            id,
            name,
            description,
            username,
            password_hash: password_hash.into(),
            role,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Field-level update DTO: only `Some` fields are applied by the repository's
/// merge function (spec.md §9 "dynamic field-level update via model
/// introspection" redesign note — this is the explicit, non-reflective
/// replacement).
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn new_rejects_empty_name() {
        let err = User::new(1, "  ", None, "bob", "hash", Role::User, now(), now()).unwrap_err();
        assert!(matches!(err, ValidationError::NameIsEmptyString));
    }

    #[test]
    fn new_rejects_empty_username() {
        let err = User::new(1, "Bob", None, " ", "hash", Role::User, now(), now()).unwrap_err();
        assert!(matches!(err, ValidationError::UsernameIsEmptyString));
    }

    #[test]
    fn accessors_roundtrip() {
        let user = User::new(7, "Bob", Some("bio".into()), "bob99", "hash", Role::Admin, now(), now()).unwrap();
        assert_eq!(user.id(), 7);
        assert_eq!(user.name(), "Bob");
        assert_eq!(user.description(), Some("bio"));
        assert_eq!(user.username(), "bob99");
        assert_eq!(user.role(), Role::Admin);
    }
}
