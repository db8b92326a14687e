// Database module - provides data access layer

use std::str::FromStr;
use std::time::Duration;

use color_eyre::{eyre::ensure, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

// Re-export models for convenience
pub mod models;
pub use models::*;

// Internal modules
mod migrations;
mod respondent;
mod response;
mod survey;
mod template;
mod user;

pub use survey::SurveyFilter;

const MAX_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

// Main database handle
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        // Verify connection
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await?;
        ensure!(one == 1, "connection check failed");

        migrations::run(&pool).await?;

        tracing::info!("database connection has been verified");

        Ok(Self { pool })
    }

    pub async fn migration_applied(&self, version: &str) -> Result<bool> {
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?)",
        )
        .bind(version)
        .fetch_one(&self.pool)
        .await?;

        Ok(applied)
    }
}
