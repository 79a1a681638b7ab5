//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use notetaker_web::config::{ConfigError, StorageConfig};
use notetaker_web::db;

/// Errors shared by commands that need the database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storage variables are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No database URL is configured.
    #[error("Missing environment variable: NOTETAKER_DATABASE_URL (or DATABASE_URL)")]
    NoDatabase,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the configured database.
///
/// Returns the pool and the notes table name.
///
/// # Errors
///
/// Returns an error if no database URL is set or the connection fails.
pub async fn connect() -> Result<(PgPool, String), CommandError> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let StorageConfig::Postgres {
        database_url,
        notes_table,
    } = StorageConfig::from_env()?
    else {
        return Err(CommandError::NoDatabase);
    };

    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");
    Ok((pool, notes_table))
}
