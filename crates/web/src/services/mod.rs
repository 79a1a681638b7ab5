//! Business logic services for notetaker.
//!
//! # Services
//!
//! - `auth` - Registration and login over a credential store
//! - `notes` - The note store contract and its in-memory backend

pub mod auth;
pub mod notes;
