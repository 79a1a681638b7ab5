//! In-memory note store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use notetaker_core::{NoteId, Username};

use super::{NoteError, NoteStore};
use crate::models::Note;

/// Note store kept in process memory.
///
/// A single mutex serialises every operation. Notes are kept in insertion
/// order; lookups are linear scans.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
}

impl MemoryNoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create(&self, owner: &Username, content: &str) -> Result<NoteId, NoteError> {
        let note = Note::new(owner.clone(), content.to_owned(), Utc::now());
        let id = note.id.clone();
        self.notes.lock().await.push(note);
        Ok(id)
    }

    async fn read(&self, id: &NoteId) -> Result<Note, NoteError> {
        self.notes
            .lock()
            .await
            .iter()
            .find(|note| &note.id == id)
            .cloned()
            .ok_or_else(|| NoteError::NotFound(id.clone()))
    }

    async fn list_by_owner(&self, owner: &Username) -> Result<Vec<Note>, NoteError> {
        // Newest insertion first, then a stable sort keeps that order for ties.
        let mut owned: Vec<Note> = self
            .notes
            .lock()
            .await
            .iter()
            .rev()
            .filter(|note| note.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.last_modified_at.cmp(&a.last_modified_at));
        Ok(owned)
    }

    async fn update(&self, id: &NoteId, content: &str) -> Result<(), NoteError> {
        let mut notes = self.notes.lock().await;
        let note = notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| NoteError::NotFound(id.clone()))?;
        note.content = content.to_owned();
        note.last_modified_at = note.last_modified_at.max(Utc::now());
        Ok(())
    }

    async fn record_view(&self, id: &NoteId) -> Result<(), NoteError> {
        let mut notes = self.notes.lock().await;
        let note = notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| NoteError::NotFound(id.clone()))?;
        note.view_count = note.view_count.saturating_add(1);
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> Result<(), NoteError> {
        let mut notes = self.notes.lock().await;
        let position = notes
            .iter()
            .position(|note| &note.id == id)
            .ok_or_else(|| NoteError::NotFound(id.clone()))?;
        // Vec::remove shifts the tail, so the remaining notes keep their order.
        notes.remove(position);
        Ok(())
    }
}
