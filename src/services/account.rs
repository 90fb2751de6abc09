//! Account Service (spec.md §4.7, C8): cascading user delete, the fav-playlist
//! registration side effect, subscriptions, and artist profile projection.

use sqlx::PgPool;

use crate::auth::password;
use crate::domain::image_target::ImageTarget;
use crate::domain::playlist::Playlist;
use crate::domain::subscription::Subscription;
use crate::domain::user::{User, UserUpdate};
use crate::domain::{Pagination, Role, ValidationError};
use crate::repository::albums_repo::AlbumSearch;
use crate::repository::blob_repo::BlobError;
use crate::repository::users_repo::{NewUser, UserSearch};
use crate::repository::{
    EntityKind, PgAlbumsRepository, PgPlaylistsRepository, PgSubscriptionsRepository, PgTracksRepository,
    PgUsersRepository, RepositoryError, S3BlobRepository,
};

use super::music::MusicService;
use super::AccountServiceError;

/// Lists enumerated "all of a parent's children" with this limit instead of
/// true pagination (spec.md §4.7 "with a high limit").
const HIGH_LIMIT: i64 = 10_000;

pub struct NewAccount {
    pub name: String,
    pub description: Option<String>,
    pub username: String,
    pub password: String,
}

pub struct AccountService {
    users: PgUsersRepository,
    playlists: PgPlaylistsRepository,
    albums: PgAlbumsRepository,
    tracks: PgTracksRepository,
    subscriptions: PgSubscriptionsRepository,
    blobs: S3BlobRepository,
    music: MusicService,
}

impl AccountService {
    pub fn new(blobs: S3BlobRepository) -> Self {
        Self {
            users: PgUsersRepository::new(),
            playlists: PgPlaylistsRepository::new(),
            albums: PgAlbumsRepository::new(),
            tracks: PgTracksRepository::new(),
            subscriptions: PgSubscriptionsRepository::new(),
            music: MusicService::new(blobs.clone()),
            blobs,
        }
    }

    /// Registers a new User and immediately creates its default "fav"
    /// playlist (spec.md §4.7 "Registration side-effect"). Fav-creation
    /// failure is reported distinctly; the user row is not rolled back.
    pub async fn register(&self, pool: &PgPool, input: NewAccount) -> Result<(User, Playlist), AccountServiceError> {
        let password_hash = password::hash(&input.password)?;

        let user = self
            .users
            .create(
                pool,
                NewUser { name: input.name, description: input.description, username: input.username, password_hash, role: Role::User },
            )
            .await?;

        let fav = self
            .playlists
            .create(pool, user.id(), Playlist::FAV_NAME)
            .await
            .map_err(AccountServiceError::FavPlaylistCreationFailed)?;

        Ok((user, fav))
    }

    pub async fn get_user(&self, pool: &PgPool, id: i32) -> Result<User, AccountServiceError> {
        Ok(self.users.get_by_id(pool, id).await?)
    }

    /// Verifies username/password and returns the matching User (spec.md §6
    /// "POST /user/login/"). A missing username and a wrong password are
    /// both reported as `RepositoryError::NotFound` — the boundary maps
    /// this to the same "invalid credentials" response either way, so the
    /// caller can't distinguish a bad username from a bad password.
    pub async fn login(&self, pool: &PgPool, username: &str, password_plain: &str) -> Result<User, AccountServiceError> {
        let user = self
            .users
            .get_by_username(pool, username)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::User, username))?;

        if !password::verify(password_plain, user.password_hash())? {
            return Err(RepositoryError::not_found(EntityKind::User, username).into());
        }

        Ok(user)
    }

    /// Field-level merge update; `update.password_hash`, if set, is assumed
    /// already bcrypt-hashed by the caller (the HTTP boundary hashes
    /// incoming plaintext before building this DTO).
    pub async fn update_user(&self, pool: &PgPool, id: i32, update: UserUpdate) -> Result<User, AccountServiceError> {
        Ok(self.users.update(pool, id, update).await?)
    }

    pub async fn get_user_image(&self, target_user_id: i32) -> Result<Vec<u8>, AccountServiceError> {
        Ok(self.blobs.get_image(&ImageTarget::User(target_user_id)).await?)
    }

    pub async fn put_user_image(&self, user_id: i32, bytes: Vec<u8>, content_type: &str) -> Result<(), AccountServiceError> {
        self.blobs.put_image(&ImageTarget::User(user_id), bytes, content_type).await?;
        Ok(())
    }

    /// Cascading delete, in the exact step order of spec.md §4.7 "Delete
    /// user": playlists, then per-album tracks + album cover, then the user
    /// row, then best-effort profile-image cleanup. Subscriptions and
    /// playlist-track rows fall out through the FK CASCADE triggered by the
    /// user-row delete.
    pub async fn delete_user(&self, pool: &PgPool, user_id: i32) -> Result<(), AccountServiceError> {
        let playlists = self.playlists.list_by_author(pool, user_id, HIGH_LIMIT).await?;
        for playlist in playlists {
            match self.playlists.delete(pool, playlist.id()).await {
                Ok(()) | Err(RepositoryError::NotFound { kind: EntityKind::Playlist, .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let albums = self
            .albums
            .search(pool, &AlbumSearch { artist_id: Some(user_id), ..Default::default() }, &Pagination { skip: 0, limit: HIGH_LIMIT })
            .await?;

        for album in albums {
            let tracks = self.tracks.list_by_album(pool, album.id(), HIGH_LIMIT).await?;
            for track in tracks {
                self.music.delete_track(pool, track.id()).await?;
            }

            match self.blobs.delete_image(&ImageTarget::Album(album.id())).await {
                Ok(()) | Err(BlobError::ImageFileNotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.users.delete(pool, user_id).await?;

        match self.blobs.delete_image(&ImageTarget::User(user_id)).await {
            Ok(()) | Err(BlobError::ImageFileNotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn subscribe(&self, pool: &PgPool, subscriber_id: i32, artist_id: i32) -> Result<Subscription, AccountServiceError> {
        if subscriber_id == artist_id {
            return Err(ValidationError::SelfSubscription(subscriber_id).into());
        }
        Ok(self.subscriptions.create(pool, subscriber_id, artist_id).await?)
    }

    pub async fn unsubscribe(&self, pool: &PgPool, subscriber_id: i32, artist_id: i32) -> Result<(), AccountServiceError> {
        Ok(self.subscriptions.delete(pool, subscriber_id, artist_id).await?)
    }

    pub async fn list_subscriptions(&self, pool: &PgPool, subscriber_id: i32, skip: i64, limit: i64) -> Result<Vec<Subscription>, AccountServiceError> {
        Ok(self.subscriptions.list_subscriptions(pool, subscriber_id, skip, limit).await?)
    }

    pub async fn list_subscribers(&self, pool: &PgPool, artist_id: i32, skip: i64, limit: i64) -> Result<Vec<Subscription>, AccountServiceError> {
        Ok(self.subscriptions.list_subscribers(pool, artist_id, skip, limit).await?)
    }

    pub async fn subscriber_count(&self, pool: &PgPool, artist_id: i32) -> Result<i64, AccountServiceError> {
        Ok(self.subscriptions.subscriber_count(pool, artist_id).await?)
    }

    /// Artist profile projection (GLOSSARY: "Artist — a User viewed through
    /// the album/track ownership relation").
    pub async fn get_artist_profile(&self, pool: &PgPool, artist_id: i32) -> Result<(User, i64), AccountServiceError> {
        let user = self.users.get_by_id(pool, artist_id).await?;
        let subscriber_count = self.subscriptions.subscriber_count(pool, artist_id).await?;
        Ok((user, subscriber_count))
    }

    /// Fuzzy artist search (SPEC_FULL.md §3 "Supplemented features",
    /// grounded in `original_source/backend/api/routers/user.py::get_artists`):
    /// a plain `UserSearch` over name/timestamps, each row paired with its
    /// subscriber count the same way `get_artist_profile` pairs a single one.
    pub async fn search_artists(&self, pool: &PgPool, filter: &UserSearch, pagination: &Pagination) -> Result<Vec<(User, i64)>, AccountServiceError> {
        let users = self.users.search(pool, filter, pagination).await?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let subscriber_count = self.subscriptions.subscriber_count(pool, user.id()).await?;
            out.push((user, subscriber_count));
        }
        Ok(out)
    }

    /// First-admin bootstrap (SPEC_FULL.md §3, grounded in
    /// `original_source/backend/api/admin.py::bootstrap_admin`): refuses
    /// once any admin already exists, otherwise creates a User with
    /// `Role::Admin` directly (no fav-playlist side effect — that's a
    /// registration-specific step, not a general user-creation one).
    pub async fn create_admin(&self, pool: &PgPool, name: String, username: String, password: &str) -> Result<User, AccountServiceError> {
        if self.users.any_with_role(pool, Role::Admin).await? {
            return Err(AccountServiceError::AdminAlreadyExists);
        }

        let password_hash = password::hash(password)?;
        Ok(self.users.create(pool, NewUser { name, description: None, username, password_hash, role: Role::Admin }).await?)
    }
}
