//! Note route handlers.
//!
//! A user only ever sees their own notes. A note that belongs to someone else
//! is handled exactly like one that does not exist.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use notetaker_core::{NoteId, Username};

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::{CurrentIdentity, RequireAuth};
use crate::models::{Identity, Note};
use crate::routes::{fields_or_default, pressed};
use crate::services::notes::NoteError;
use crate::state::AppState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// =============================================================================
// Form Types
// =============================================================================

/// Home page form data.
#[derive(Debug, Default, Deserialize)]
pub struct HomeForm {
    pub createnote: Option<String>,
    pub logout: Option<String>,
}

/// New note form data.
#[derive(Debug, Default, Deserialize)]
pub struct CreateForm {
    pub create: Option<String>,
    pub back: Option<String>,
    pub note: Option<String>,
}

/// View/edit note form data.
#[derive(Debug, Default, Deserialize)]
pub struct ReadForm {
    pub update: Option<String>,
    pub delete: Option<String>,
    pub back: Option<String>,
    pub note: Option<String>,
}

// =============================================================================
// Display Types
// =============================================================================

/// A note formatted for templates.
#[derive(Debug, Clone)]
pub struct NoteView {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub last_modified_at: String,
    pub view_count: u64,
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.to_string(),
            content: note.content.clone(),
            created_at: note.created_at.format(TIMESTAMP_FORMAT).to_string(),
            last_modified_at: note.last_modified_at.format(TIMESTAMP_FORMAT).to_string(),
            view_count: note.view_count,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template listing the user's notes.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub username: String,
    pub notes: Vec<NoteView>,
}

/// New note page template.
#[derive(Template, WebTemplate)]
#[template(path = "create_note.html")]
pub struct CreateNoteTemplate;

/// Single note page template.
#[derive(Template, WebTemplate)]
#[template(path = "view_note.html")]
pub struct ViewNoteTemplate {
    pub note: NoteView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the note list, or follow one of its buttons.
///
/// # Errors
///
/// Returns an error if the notes cannot be listed.
#[tracing::instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    form: Result<Form<HomeForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = fields_or_default(form);
    let Identity::Authenticated { username } = identity else {
        return Ok(Redirect::to("/login").into_response());
    };

    if pressed(form.createnote.as_ref()) {
        return Ok(Redirect::to("/create").into_response());
    }
    if pressed(form.logout.as_ref()) {
        return Ok(Redirect::to("/logout").into_response());
    }

    let notes = state.notes().list_by_owner(&username).await?;

    Ok(HomeTemplate {
        username: username.to_string(),
        notes: notes.iter().map(NoteView::from).collect(),
    }
    .into_response())
}

/// Display the new note form, or store the submitted note.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(username): RequireAuth,
    form: Result<Form<CreateForm>, FormRejection>,
) -> Response {
    let form = fields_or_default(form);
    if pressed(form.create.as_ref()) {
        let content = form.note.unwrap_or_default();
        match state.notes().create(&username, &content).await {
            Ok(id) => {
                tracing::info!(username = %username, note_id = %id, "Note created");
                add_breadcrumb("notes", "Created note", Some(&[("note_id", id.as_str())]));
            }
            Err(e) => log_note_error(&e),
        }
        return Redirect::to("/").into_response();
    }

    if pressed(form.back.as_ref()) {
        return Redirect::to("/").into_response();
    }

    CreateNoteTemplate.into_response()
}

/// Display a note, or apply one of its buttons.
///
/// Rendering the note counts as one view.
#[tracing::instrument(skip_all)]
pub async fn read(
    State(state): State<AppState>,
    RequireAuth(username): RequireAuth,
    Path(id): Path<NoteId>,
    form: Result<Form<ReadForm>, FormRejection>,
) -> Response {
    let form = fields_or_default(form);
    let note = match owned_note(&state, &username, &id).await {
        Ok(note) => note,
        Err(e) => {
            log_note_error(&e);
            return Redirect::to("/").into_response();
        }
    };

    if pressed(form.update.as_ref()) {
        let content = form.note.unwrap_or_default();
        match state.notes().update(&note.id, &content).await {
            Ok(()) => tracing::info!(username = %username, note_id = %note.id, "Note updated"),
            Err(e) => log_note_error(&e),
        }
        return Redirect::to("/").into_response();
    }

    if pressed(form.delete.as_ref()) {
        match state.notes().delete(&note.id).await {
            Ok(()) => {
                tracing::info!(username = %username, note_id = %note.id, "Note deleted");
                add_breadcrumb("notes", "Deleted note", Some(&[("note_id", note.id.as_str())]));
            }
            Err(e) => log_note_error(&e),
        }
        return Redirect::to("/").into_response();
    }

    if pressed(form.back.as_ref()) {
        return Redirect::to("/").into_response();
    }

    let response = ViewNoteTemplate {
        note: NoteView::from(&note),
    }
    .into_response();

    if let Err(e) = state.notes().record_view(&note.id).await {
        log_note_error(&e);
    }

    response
}

/// Fetch `id` if `username` owns it.
async fn owned_note(state: &AppState, username: &Username, id: &NoteId) -> Result<Note, NoteError> {
    let note = state.notes().read(id).await?;
    if note.is_owned_by(username) {
        Ok(note)
    } else {
        tracing::warn!(
            username = %username,
            note_id = %id,
            "Refused access to another user's note"
        );
        Err(NoteError::NotFound(id.clone()))
    }
}

fn log_note_error(error: &NoteError) {
    match error {
        NoteError::NotFound(id) => tracing::warn!(note_id = %id, "Note not found"),
        NoteError::Storage(e) => tracing::error!(error = %e, "Note storage failed"),
    }
}
