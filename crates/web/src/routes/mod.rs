//! HTTP route handlers for notetaker.
//!
//! # Route Structure
//!
//! Actions are chosen by which submit button's form field is present, not by
//! the HTTP method. GET and POST reach the same handler.
//!
//! ```text
//! GET|POST /                - Note list (createnote, logout)
//! GET|POST /register        - Registration (register, username, password, back)
//! GET|POST /login           - Login (login, username, password, register, back)
//! GET      /logout          - Logout
//! GET|POST /create          - New note (create, note, back)
//! GET|POST /read/{note}     - View/edit note (update, delete, back, note)
//! GET      /health          - Liveness
//! GET      /health/ready    - Readiness
//! ```

pub mod auth;
pub mod health;
pub mod notes;

use axum::{Form, Router, extract::rejection::FormRejection, routing::get};

use crate::state::AppState;

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register).post(auth::register))
        .route("/login", get(auth::login).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create the note routes router.
pub fn note_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::home).post(notes::home))
        .route("/create", get(notes::create).post(notes::create))
        .route("/read/{note}", get(notes::read).post(notes::read))
}

/// Create all routes for notetaker.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(note_routes())
        .merge(auth_routes())
}

/// Returns true if a submit button's field was sent with a value.
pub(crate) fn pressed(field: Option<&String>) -> bool {
    field.is_some_and(|value| !value.is_empty())
}

/// The submitted fields, or none at all if the request carried no readable form.
///
/// A request without a form content type counts as an empty form.
pub(crate) fn fields_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(fields)) => fields,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable form, treating as empty");
            T::default()
        }
    }
}
