//! `OnceLock`-memoized configuration loader (spec.md §6 "Environment"),
//! following the teacher's `Config`/`get_config()` shape but carrying the
//! Postgres/Redis/S3/auth sections this system's topology needs instead of
//! the teacher's SQLite path + media directories.

use std::fs;
use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigLoadingError {
    #[error("Failed to read the config (./config.toml): {0}")]
    FailedToReadConfig(String),

    #[error("Failed to parse the config: {0}")]
    FailedToParseConfig(String),
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub blob_store: BlobStoreConfig,
    pub queue_store: QueueStoreConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct BlobStoreConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub music_bucket: String,
    pub cover_bucket: String,
}

#[derive(Debug, Deserialize)]
pub struct QueueStoreConfig {
    pub url: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub token_secret: String,
    pub token_algorithm: String,
    pub token_expiry_minutes: i64,
    pub admin_bootstrap_key: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigLoadingError> {
        let config_str =
            fs::read_to_string("config.toml").map_err(|err| ConfigLoadingError::FailedToReadConfig(err.to_string()))?;
        let config: Config =
            toml::from_str(&config_str).map_err(|err| ConfigLoadingError::FailedToParseConfig(err.to_string()))?;

        Ok(config)
    }
}

pub fn get_config() -> Result<&'static Config, ConfigLoadingError> {
    static CONFIG: OnceLock<Result<Config, ConfigLoadingError>> = OnceLock::new();

    let result = CONFIG.get_or_init(Config::load);

    match result {
        Ok(config) => Ok(config),
        Err(err) => Err(err.clone()),
    }
}
