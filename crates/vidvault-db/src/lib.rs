//! Vidvault DB Library
//!
//! Metadata store collaborator for the ingestion pipeline. The pipeline
//! depends on the `VideoStore` trait only; `PgVideoStore` is the Postgres
//! implementation backed by sqlx.

pub mod video_store;

pub use video_store::{PgVideoStore, StoreError, VideoStore};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Connect to the metadata database.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
}

/// Run embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
