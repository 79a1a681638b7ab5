//! HTTP middleware stack for notetaker.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, signed `myappcookies` cookie)
//!
//! Identity extractors read what the session layer put in the request
//! extensions.

pub mod identity;
pub mod session;

pub use identity::{
    CurrentIdentity, RequireAuth, clear_identity, establish_identity, resolve_identity,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
