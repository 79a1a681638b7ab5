//! Database operations for notetaker `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Credentials (username + Argon2 hash)
//! - notes table (name from `NOTETAKER_NOTES_TABLE`) - Notes keyed by ID, with
//!   an owner index ordered by last modification
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Schema
//!
//! Tables are created explicitly, never at web startup:
//! ```bash
//! cargo run -p notetaker-cli -- migrate
//! ```

pub mod notes;
pub mod schema;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use notes::PgNoteStore;
pub use users::PgCredentialStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
