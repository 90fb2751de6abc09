//! Request/response DTOs (spec.md §4.8, §9 "dynamic field-level update"
//! redesign note: explicit `Update*` structs, no reflection). Mirrors the
//! teacher's practice of keeping wire shapes separate from domain types
//! (the teacher has no DTOs of its own — it renders HTML — so these follow
//! `original_source/backend/dto/*.py`'s field names translated to
//! idiomatic `serde` structs).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::activity::ActivityEvent;
use crate::domain::album::Album;
use crate::domain::genre::Genre;
use crate::domain::playlist::Playlist;
use crate::domain::playlist_track::PlaylistTrack;
use crate::domain::subscription::Subscription;
use crate::domain::track::Track;
use crate::domain::user::User;
use crate::domain::Role;

/// `{token, next}` returned by register/login (spec.md §6); `next` is
/// always `"/home"`, matching `original_source/backend/dto/accounts.py`'s
/// `LoginRegister`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub next: &'static str,
}

impl AuthResponse {
    pub fn new(token: String) -> Self {
        Self { token, next: "/home" }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            id: u.id(),
            name: u.name().to_string(),
            description: u.description().map(str::to_string),
            username: u.username().to_string(),
            role: u.role(),
            created_at: u.created_at(),
            updated_at: u.updated_at(),
        }
    }
}

/// Artist projection (SPEC_FULL.md §3 supplement, grounded in
/// `original_source/backend/dto/accounts.py::Artist`): public subset of a
/// User plus a derived subscriber count.
#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub subscriber_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct AlbumResponse {
    pub id: i32,
    pub name: String,
    pub artist_id: i32,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Album> for AlbumResponse {
    fn from(a: &Album) -> Self {
        Self {
            id: a.id(),
            name: a.name().to_string(),
            artist_id: a.artist_id(),
            release_date: a.release_date(),
            created_at: a.created_at(),
            updated_at: a.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAlbumRequest {
    pub id: i32,
    pub name: Option<String>,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: i32,
    pub name: String,
    pub album_id: i32,
    pub artist_id: i32,
    pub genre_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Track> for TrackResponse {
    fn from(t: &Track) -> Self {
        Self {
            id: t.id(),
            name: t.name().to_string(),
            album_id: t.album_id(),
            artist_id: t.artist_id(),
            genre_id: t.genre_id(),
            release_date: t.release_date(),
            created_at: t.created_at(),
            updated_at: t.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTrackRequest {
    pub id: i32,
    pub name: Option<String>,
    pub album_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Genre> for GenreResponse {
    fn from(g: &Genre) -> Self {
        Self { id: g.id(), name: g.name().to_string(), created_at: g.created_at(), updated_at: g.updated_at() }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGenreRequest {
    pub id: i32,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Playlist> for PlaylistResponse {
    fn from(p: &Playlist) -> Self {
        Self { id: p.id(), author_id: p.author_id(), name: p.name().to_string(), created_at: p.created_at(), updated_at: p.updated_at() }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub author_id: Option<i32>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub id: i32,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistTrackResponse {
    pub playlist_id: i32,
    pub track_id: i32,
    pub added_at: DateTime<Utc>,
}

impl From<&PlaylistTrack> for PlaylistTrackResponse {
    fn from(pt: &PlaylistTrack) -> Self {
        Self { playlist_id: pt.playlist_id(), track_id: pt.track_id(), added_at: pt.added_at() }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddPlaylistTrackRequest {
    pub playlist_id: i32,
    pub track_id: i32,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub subscriber_id: i32,
    pub artist_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(s: &Subscription) -> Self {
        Self { subscriber_id: s.subscriber_id(), artist_id: s.artist_id(), created_at: s.created_at() }
    }
}

/// `subscriber_id` unset resolves to the caller (spec.md §4.5 mode 1).
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub subscriber_id: Option<i32>,
    pub artist_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityEventResponse {
    pub id: i64,
    pub user_id: i32,
    pub track_id: i32,
    pub event: String,
    pub time: DateTime<Utc>,
}

impl From<&ActivityEvent> for ActivityEventResponse {
    fn from(e: &ActivityEvent) -> Self {
        Self { id: e.id(), user_id: e.user_id(), track_id: e.track_id(), event: e.event().as_str().to_string(), time: e.time() }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddActivityEventRequest {
    pub user_id: Option<i32>,
    pub track_id: i32,
    pub event: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ActivityFilterRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    #[serde(default)]
    pub user_ids: Vec<i32>,
    #[serde(default)]
    pub track_ids: Vec<i32>,
    #[serde(default)]
    pub events: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_activity_limit")]
    pub limit: i64,
}

fn default_activity_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct QueuePushRequest {
    pub user_id: Option<i32>,
    pub track_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct QueueListQuery {
    pub user_id: Option<i32>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct QueueDeleteQuery {
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct QueueInsertRequest {
    pub user_id: Option<i32>,
    pub track_id: i32,
    pub position: i64,
}

#[derive(Debug, Deserialize)]
pub struct QueueMoveRequest {
    pub user_id: Option<i32>,
    pub src: i64,
    pub dest: i64,
}

#[derive(Debug, Deserialize)]
pub struct QueueRemoveRequest {
    pub user_id: Option<i32>,
    pub position: i64,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub tracks: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapAdminRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}
