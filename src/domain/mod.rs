pub mod user;
pub mod genre;
pub mod album;
pub mod track;
pub mod playlist;
pub mod playlist_track;
pub mod subscription;
pub mod activity;
pub mod image_target;

use serde::{Serialize, Deserialize};
use thiserror;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Name field cannot be an empty string.")]
    NameIsEmptyString,

    #[error("Username field cannot be an empty string.")]
    UsernameIsEmptyString,

    #[error("Threshold must be between 0 and 1, got {0}.")]
    ThresholdOutOfRange(f64),

    #[error("Pagination limit must be between 1 and {max}, got {got}.")]
    LimitOutOfRange { got: i64, max: i64 },

    #[error("Pagination skip cannot be negative, got {0}.")]
    NegativeSkip(i64),

    #[error("subscriber_id and artist_id cannot be the same user ({0}).")]
    SelfSubscription(i32),
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid role '{0}'. Expected one of 'user', 'admin', 'analyst'.")]
pub struct RoleParseError(String);

/// A User's permission level. Role transitions only happen through an
/// admin-authorized update (`auth::authorize::admin_only`); the domain type
/// itself just carries the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Analyst,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Analyst => "analyst",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl TryFrom<&str> for Role {
    type Error = RoleParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "analyst" => Ok(Role::Analyst),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::try_from(value.as_str())
    }
}

impl From<Role> for &'static str {
    fn from(value: Role) -> Self {
        value.as_str()
    }
}

/// Common pagination shared by every search endpoint in §4.2.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(skip: i64, limit: i64) -> Result<Self, ValidationError> {
        if skip < 0 {
            return Err(ValidationError::NegativeSkip(skip));
        }
        if limit < 1 || limit > Self::MAX_LIMIT {
            return Err(ValidationError::LimitOutOfRange { got: limit, max: Self::MAX_LIMIT });
        }
        Ok(Self { skip, limit })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: Self::DEFAULT_LIMIT }
    }
}

/// Trigram similarity floor for fuzzy `name` search, see §4.2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityThreshold(f64);

impl SimilarityThreshold {
    pub const DEFAULT: f64 = 0.3;

    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ThresholdOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
