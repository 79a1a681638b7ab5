//! Notetaker web application library.
//!
//! This crate provides the note-taking site as a library, allowing it to be
//! tested in-process and reused by the operator CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore, service::SignedCookie};

use crate::state::AppState;

/// Build the full application router.
///
/// The session layer is passed in so the caller decides where session
/// records live (`MemoryStore` or `PostgresStore`).
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    routes::routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
