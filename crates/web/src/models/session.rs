//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use notetaker_core::Username;

/// Session-stored user record.
///
/// This is the shape written into the session store. Handlers never read it
/// directly; they go through [`Identity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Account name; empty for anonymous visitors.
    pub username: String,
    /// Whether the visitor logged in or registered during this session.
    pub authenticated: bool,
}

impl SessionUser {
    /// Record for a freshly authenticated user.
    #[must_use]
    pub fn authenticated(username: &Username) -> Self {
        Self {
            username: username.to_string(),
            authenticated: true,
        }
    }
}

/// The principal behind one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// No valid login in the session.
    #[default]
    Anonymous,
    /// Logged in as `username`.
    Authenticated {
        /// The logged-in account.
        username: Username,
    },
}

impl Identity {
    /// Returns the username if authenticated.
    #[must_use]
    pub const fn username(&self) -> Option<&Username> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { username } => Some(username),
        }
    }

    /// Returns true if the request carries a login.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

impl From<SessionUser> for Identity {
    fn from(user: SessionUser) -> Self {
        if !user.authenticated {
            return Self::Anonymous;
        }
        Username::parse(&user.username).map_or(Self::Anonymous, |username| {
            Self::Authenticated { username }
        })
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current user record.
    pub const USER: &str = "user";
}
