//! `PostgreSQL` note store.
//!
//! Queries are built at runtime because the table name comes from
//! configuration. Every operation is a single statement; atomicity is per
//! statement.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;

use notetaker_core::{NoteId, Username};

use super::RepositoryError;
use crate::config::validate_table_name;
use crate::models::Note;
use crate::services::notes::{NoteError, NoteStore};

/// Columns selected for every note query.
const NOTE_COLUMNS: &str =
    "note_id, user_id, creation_date, last_modified_date, content, views";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` note queries.
#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    note_id: String,
    user_id: String,
    creation_date: DateTime<Utc>,
    last_modified_date: DateTime<Utc>,
    content: String,
    views: i64,
}

impl TryFrom<NoteRow> for Note {
    type Error = RepositoryError;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        let owner = Username::parse(&row.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid owner on note {}: {e}", row.note_id))
        })?;
        let view_count = u64::try_from(row.views).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative view count on note {}",
                row.note_id
            ))
        })?;

        Ok(Self {
            id: NoteId::from(row.note_id),
            owner,
            content: row.content,
            created_at: row.creation_date,
            last_modified_at: row.last_modified_date,
            view_count,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// Note store backed by a `PostgreSQL` table.
#[derive(Debug, Clone)]
pub struct PgNoteStore {
    pool: PgPool,
    table: String,
}

impl PgNoteStore {
    /// Create a store over `table`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if `table` is not a plain
    /// SQL identifier.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, RepositoryError> {
        let table = table.into();
        validate_table_name(&table).map_err(RepositoryError::DataCorruption)?;
        Ok(Self { pool, table })
    }

    /// Current time at the precision `TIMESTAMPTZ` keeps.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    fn not_found_unless_touched(rows_affected: u64, id: &NoteId) -> Result<(), NoteError> {
        if rows_affected == 0 {
            return Err(NoteError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn create(&self, owner: &Username, content: &str) -> Result<NoteId, NoteError> {
        let id = NoteId::generate();
        let sql = format!(
            "INSERT INTO {} (note_id, user_id, creation_date, last_modified_date, content, views) \
             VALUES ($1, $2, $3, $3, $4, 0)",
            self.table
        );

        sqlx::query(&sql)
            .bind(&id)
            .bind(owner)
            .bind(Self::now())
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(id)
    }

    async fn read(&self, id: &NoteId) -> Result<Note, NoteError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM {} WHERE note_id = $1",
            self.table
        );

        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?
            .ok_or_else(|| NoteError::NotFound(id.clone()))?;

        Ok(Note::try_from(row)?)
    }

    async fn list_by_owner(&self, owner: &Username) -> Result<Vec<Note>, NoteError> {
        // note_id is time-sortable, so it breaks ties newest-created first.
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM {} WHERE user_id = $1 \
             ORDER BY last_modified_date DESC, note_id DESC",
            self.table
        );

        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        rows.into_iter()
            .map(|row| Note::try_from(row).map_err(NoteError::from))
            .collect()
    }

    async fn update(&self, id: &NoteId, content: &str) -> Result<(), NoteError> {
        let sql = format!(
            "UPDATE {} SET content = $2, last_modified_date = GREATEST(last_modified_date, $3) \
             WHERE note_id = $1",
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(content)
            .bind(Self::now())
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Self::not_found_unless_touched(result.rows_affected(), id)
    }

    async fn record_view(&self, id: &NoteId) -> Result<(), NoteError> {
        let sql = format!(
            "UPDATE {} SET views = views + 1 WHERE note_id = $1",
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Self::not_found_unless_touched(result.rows_affected(), id)
    }

    async fn delete(&self, id: &NoteId) -> Result<(), NoteError> {
        let sql = format!("DELETE FROM {} WHERE note_id = $1", self.table);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Self::not_found_unless_touched(result.rows_affected(), id)
    }
}
