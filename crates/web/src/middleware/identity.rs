//! Identity resolution and extractors.
//!
//! The session holds a [`SessionUser`] record under [`session_keys::USER`].
//! Reading it never fails a request: anything missing, expired or unreadable
//! is an anonymous visitor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use notetaker_core::Username;

use crate::models::{Identity, SessionUser, session_keys};

/// Decode the identity carried by `session`.
///
/// Returns `Identity::Anonymous` if the record is missing, malformed, or the
/// session store cannot be read.
pub async fn resolve_identity(session: &Session) -> Identity {
    match session.get::<SessionUser>(session_keys::USER).await {
        Ok(Some(user)) => Identity::from(user),
        Ok(None) => Identity::Anonymous,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable session record, treating as anonymous");
            Identity::Anonymous
        }
    }
}

/// Record `username` as logged in for this session.
///
/// The session ID is rotated and the inactivity window restarts.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn establish_identity(
    session: &Session,
    username: &Username,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::USER, SessionUser::authenticated(username))
        .await
}

/// Log the session out.
///
/// The record is deleted from the store and the cookie is sent back expired.
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_identity(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Extractor for the identity of the current request. Never rejects.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     match identity.username() {
///         Some(name) => format!("Hello, {name}!"),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = match parts.extensions.get::<Session>() {
            Some(session) => resolve_identity(session).await,
            None => Identity::Anonymous,
        };

        Ok(Self(identity))
    }
}

/// Extractor that requires a logged-in user.
///
/// Anonymous visitors are redirected to the home page, which sends them on
/// to the login page.
pub struct RequireAuth(pub Username);

/// Error returned when a route needs a logged-in user.
#[derive(Debug)]
pub enum AuthRejection {
    /// Visitor is anonymous.
    RedirectHome,
    /// The session layer is not installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::MissingSession => {
                tracing::error!("Session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        match resolve_identity(session).await {
            Identity::Authenticated { username } => Ok(Self(username)),
            Identity::Anonymous => Err(AuthRejection::RedirectHome),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_empty_session_is_anonymous() {
        let session = new_session();
        assert_eq!(resolve_identity(&session).await, Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_establish_then_resolve() {
        let session = new_session();
        let alice = Username::parse("alice").unwrap();

        establish_identity(&session, &alice).await.unwrap();

        assert_eq!(
            resolve_identity(&session).await,
            Identity::Authenticated { username: alice }
        );
    }

    #[tokio::test]
    async fn test_mismatched_record_is_anonymous() {
        let session = new_session();
        session
            .insert(session_keys::USER, "not a user record")
            .await
            .unwrap();

        assert_eq!(resolve_identity(&session).await, Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_unauthenticated_record_is_anonymous() {
        let session = new_session();
        session
            .insert(session_keys::USER, SessionUser::default())
            .await
            .unwrap();

        assert_eq!(resolve_identity(&session).await, Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_clear_identity() {
        let session = new_session();
        let alice = Username::parse("alice").unwrap();
        establish_identity(&session, &alice).await.unwrap();

        clear_identity(&session).await.unwrap();

        assert_eq!(resolve_identity(&session).await, Identity::Anonymous);
    }
}
