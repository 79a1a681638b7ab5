//! Notetaker Core - Shared types library.
//!
//! This crate provides common types used across all Notetaker components:
//! - `web` - The note-taking web application
//! - `cli` - Command-line tools for schema setup and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for note IDs and usernames

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
