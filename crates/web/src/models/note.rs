//! Note domain type.

use chrono::{DateTime, Utc};

use notetaker_core::{NoteId, Username};

/// A single note owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Unique, immutable ID.
    pub id: NoteId,
    /// The user who created the note. Never changes.
    pub owner: Username,
    /// Note text.
    pub content: String,
    /// When the note was created.
    pub created_at: DateTime<Utc>,
    /// When the content last changed. Equal to `created_at` until the first update.
    pub last_modified_at: DateTime<Utc>,
    /// How many times the note page was viewed.
    pub view_count: u64,
}

impl Note {
    /// Build a freshly created note with no views.
    #[must_use]
    pub fn new(owner: Username, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::generate(),
            owner,
            content,
            created_at: now,
            last_modified_at: now,
            view_count: 0,
        }
    }

    /// Returns true if `username` owns this note.
    #[must_use]
    pub fn is_owned_by(&self, username: &Username) -> bool {
        &self.owner == username
    }
}
