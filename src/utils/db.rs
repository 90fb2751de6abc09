//! Application database pool (spec.md §5 "Shared resources": pool size 20,
//! 60s acquire timeout, shared across every repository), following the
//! teacher's `Database`/`get_application_db()` `OnceCell` memoization
//! pattern adapted from SQLite to Postgres with a migrations directory
//! instead of a fixed on-disk file.

use std::time::Duration;

use anyhow::{anyhow, Error};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::utils::config::get_config;

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn init_application_db(db_url: &str) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(60))
            .connect(db_url)
            .await?;

        let db = Database { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

pub async fn get_application_db() -> Result<&'static Database, Error> {
    static DB_INSTANCE: OnceCell<Result<Database, String>> = OnceCell::const_new();

    let result = DB_INSTANCE
        .get_or_init(|| async {
            let config = match get_config() {
                Ok(config) => config,
                Err(err) => return Err(err.to_string()),
            };

            match Database::init_application_db(&config.database.url).await {
                Ok(db) => Ok(db),
                Err(e) => Err(e.to_string()),
            }
        })
        .await;

    match result {
        Ok(db) => Ok(db),
        Err(msg) => Err(anyhow!("{}", msg)),
    }
}
