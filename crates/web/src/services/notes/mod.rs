//! Note storage.
//!
//! [`NoteStore`] is the one contract every handler talks to. Two backends
//! implement it and must be indistinguishable to callers:
//!
//! - [`MemoryNoteStore`] - process memory, lost on restart
//! - [`PgNoteStore`](crate::db::PgNoteStore) - `PostgreSQL` table keyed by note
//!   ID with an owner index
//!
//! The store does not check ownership; `owner` is recorded at creation and
//! used for listing. Handlers compare it against the session user.

mod memory;

pub use memory::MemoryNoteStore;

use async_trait::async_trait;
use thiserror::Error;

use notetaker_core::{NoteId, Username};

use crate::db::RepositoryError;
use crate::models::Note;

/// Errors that can occur during note operations.
#[derive(Debug, Error)]
pub enum NoteError {
    /// No note with this ID exists.
    #[error("note {0} not found")]
    NotFound(NoteId),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Create/read/update/delete/list for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Store a new note and return its fresh ID.
    ///
    /// Both timestamps are set to now and the view count to zero.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Storage` if the backend fails.
    async fn create(&self, owner: &Username, content: &str) -> Result<NoteId, NoteError>;

    /// Fetch a note by ID.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::NotFound` if no such note exists.
    async fn read(&self, id: &NoteId) -> Result<Note, NoteError>;

    /// All notes of `owner`, most recently modified first.
    ///
    /// Notes with the same modification time come most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Storage` if the backend fails.
    async fn list_by_owner(&self, owner: &Username) -> Result<Vec<Note>, NoteError>;

    /// Replace the content and refresh the modification time.
    ///
    /// The modification time never moves backwards.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::NotFound` if no such note exists.
    async fn update(&self, id: &NoteId, content: &str) -> Result<(), NoteError>;

    /// Add exactly one to the view count.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::NotFound` if no such note exists.
    async fn record_view(&self, id: &NoteId) -> Result<(), NoteError>;

    /// Remove a note.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::NotFound` if no such note exists.
    async fn delete(&self, id: &NoteId) -> Result<(), NoteError>;
}

#[cfg(test)]
pub(crate) mod contract;
