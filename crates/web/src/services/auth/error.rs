//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// The first three variants are shown to the user verbatim on the login and
/// registration pages.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration with an empty username.
    #[error("You must enter a username!")]
    EmptyUsername,

    /// Registration with a username that already exists.
    #[error("The username {0} is already taken!")]
    DuplicateUsername(String),

    /// Wrong password or unknown user.
    #[error("Your login credentials are incorrect!")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Returns true if the error is the user's doing and can be shown inline.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::EmptyUsername | Self::DuplicateUsername(_) | Self::InvalidCredentials
        )
    }
}
