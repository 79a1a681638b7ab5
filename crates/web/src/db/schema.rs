//! Table definitions.
//!
//! The notes table name is configurable, so the statements are built at
//! runtime rather than shipped as fixed migration files. Every statement is
//! idempotent.

use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use super::RepositoryError;
use crate::config::validate_table_name;

const CREATE_USERS: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        username      TEXT PRIMARY KEY CHECK (username <> ''),
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
";

/// Name of the owner index for a notes table.
#[must_use]
pub fn owner_index_name(notes_table: &str) -> String {
    format!("{notes_table}_user_id_last_modified_date_idx")
}

fn create_notes_table(notes_table: &str) -> String {
    format!(
        r"
        CREATE TABLE IF NOT EXISTS {notes_table} (
            note_id            TEXT PRIMARY KEY,
            user_id            TEXT NOT NULL,
            creation_date      TIMESTAMPTZ NOT NULL,
            last_modified_date TIMESTAMPTZ NOT NULL,
            content            TEXT NOT NULL,
            views              BIGINT NOT NULL DEFAULT 0 CHECK (views >= 0)
        )
        "
    )
}

fn create_owner_index(notes_table: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {notes_table} (user_id, last_modified_date DESC)",
        owner_index_name(notes_table)
    )
}

/// Create the users table, the notes table and its owner index.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if `notes_table` is not a plain
/// identifier, `RepositoryError::Database` if a statement fails.
pub async fn ensure_schema(pool: &PgPool, notes_table: &str) -> Result<(), RepositoryError> {
    validate_table_name(notes_table).map_err(RepositoryError::DataCorruption)?;

    sqlx::query(CREATE_USERS).execute(pool).await?;
    tracing::info!("users table ready");

    sqlx::query(&create_notes_table(notes_table))
        .execute(pool)
        .await?;
    sqlx::query(&create_owner_index(notes_table))
        .execute(pool)
        .await?;
    tracing::info!(table = %notes_table, "notes table ready");

    Ok(())
}

/// Create the session table used by `tower-sessions`.
///
/// # Errors
///
/// Returns `sqlx::Error` if the migration fails.
pub async fn ensure_session_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    PostgresStore::new(pool.clone()).migrate().await?;
    tracing::info!("session table ready");
    Ok(())
}
