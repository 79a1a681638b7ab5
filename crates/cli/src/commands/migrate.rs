//! Schema setup command.
//!
//! # Usage
//!
//! ```bash
//! notetaker-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `NOTETAKER_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `NOTETAKER_NOTES_TABLE` - Notes table name (default: notes)
//!
//! Every statement is idempotent, so running it twice is harmless.

use notetaker_web::db::schema;

use super::connect;

/// Create the users table, the notes table with its owner index, and the
/// session table.
///
/// # Errors
///
/// Returns an error if the database is not configured or a statement fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, notes_table) = connect().await?;

    schema::ensure_schema(&pool, &notes_table).await?;
    schema::ensure_session_schema(&pool).await?;

    tracing::info!(table = %notes_table, "Schema ready");
    Ok(())
}
