//! HTTP boundary (spec.md §4.8, C11). `AppState` replaces the teacher's
//! `AppState { pool: &'static SqlitePool, index_html }` with the pooled
//! resources every handler needs; each service is `Arc`-wrapped so
//! `AppState` stays cheaply `Clone` for axum's `State` extractor the way
//! the teacher's state does.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenCodec;
use crate::repository::{PgAlbumsRepository, PgGenresRepository, PgPlaylistTracksRepository, PgPlaylistsRepository, PgTracksRepository};
use crate::services::{AccountService, ActivityService, MusicService, QueueService};

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub music: Arc<MusicService>,
    pub account: Arc<AccountService>,
    pub queue: Arc<QueueService>,
    pub activity: Arc<ActivityService>,
    pub albums: Arc<PgAlbumsRepository>,
    pub tracks: Arc<PgTracksRepository>,
    pub genres: Arc<PgGenresRepository>,
    pub playlists: Arc<PgPlaylistsRepository>,
    pub playlist_tracks: Arc<PgPlaylistTracksRepository>,
    pub tokens: Arc<TokenCodec>,
    pub admin_bootstrap_key: Arc<str>,
}
