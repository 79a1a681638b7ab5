//! Domain models for notetaker.
//!
//! - [`note`] - Notes as the stores hand them out
//! - [`session`] - What the session cookie carries

pub mod note;
pub mod session;

pub use note::Note;
pub use session::{Identity, SessionUser, keys as session_keys};
