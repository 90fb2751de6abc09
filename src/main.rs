use std::sync::Arc;

use clap::Parser;
use jsonwebtoken::Algorithm;
use tonearm::auth::TokenCodec;
use tonearm::cli::{Cli, Command};
use tonearm::repository::{
    PgAlbumsRepository, PgGenresRepository, PgPlaylistTracksRepository, PgPlaylistsRepository, PgTracksRepository, RedisQueueRepository,
    S3BlobRepository,
};
use tonearm::services::{AccountService, ActivityService, MusicService, QueueService};
use tonearm::utils::config::get_config;
use tonearm::utils::db::get_application_db;
use tonearm::web::routes::create_router;
use tonearm::web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => serve().await?,
    }

    Ok(())
}

fn parse_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(anyhow::anyhow!("unsupported token algorithm: {other}")),
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = get_config()?;
    let db = get_application_db().await?;
    let pool = db.get_pool().clone();

    let blobs = S3BlobRepository::new(
        config.blob_store.endpoint.clone(),
        config.blob_store.region.clone(),
        config.blob_store.access_key.clone(),
        config.blob_store.secret_key.clone(),
        config.blob_store.music_bucket.clone(),
        config.blob_store.cover_bucket.clone(),
    )
    .await?;

    let queue_repo = RedisQueueRepository::connect(&config.queue_store.url, config.queue_store.ttl_seconds).await?;

    let algorithm = parse_algorithm(&config.auth.token_algorithm)?;
    let tokens = TokenCodec::new(config.auth.token_secret.clone(), algorithm, config.auth.token_expiry_minutes);

    let state = AppState {
        pool,
        music: Arc::new(MusicService::new(blobs.clone())),
        account: Arc::new(AccountService::new(blobs)),
        queue: Arc::new(QueueService::new(queue_repo)),
        activity: Arc::new(ActivityService::new()),
        albums: Arc::new(PgAlbumsRepository::new()),
        tracks: Arc::new(PgTracksRepository::new()),
        genres: Arc::new(PgGenresRepository::new()),
        playlists: Arc::new(PgPlaylistsRepository::new()),
        playlist_tracks: Arc::new(PgPlaylistTracksRepository::new()),
        tokens: Arc::new(tokens),
        admin_bootstrap_key: Arc::from(config.auth.admin_bootstrap_key.as_str()),
    };

    let app = create_router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!("listening on {address}");

    axum::serve(listener, app).await?;

    Ok(())
}
