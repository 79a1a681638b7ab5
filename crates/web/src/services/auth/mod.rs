//! Authentication service.
//!
//! Provides username/password registration and login on top of a
//! [`CredentialStore`]. Passwords are hashed with Argon2id; only the PHC
//! string is stored.

mod error;
pub mod seed;
mod store;

pub use error::AuthError;
pub use store::{CredentialStore, MemoryCredentialStore};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use notetaker_core::Username;

use crate::db::RepositoryError;

/// Authentication service.
///
/// Handles user registration and login. Cheap to construct per request.
pub struct AuthService<'a> {
    credentials: &'a dyn CredentialStore,
    hasher: Argon2<'static>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service with default Argon2id parameters.
    #[must_use]
    pub fn new(credentials: &'a dyn CredentialStore) -> Self {
        Self {
            credentials,
            hasher: Argon2::default(),
        }
    }

    /// Use a differently tuned hasher for new passwords.
    ///
    /// Verification always uses the parameters recorded in the stored hash.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2<'static>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Returns true if `username` is already registered.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn is_username_taken(&self, username: &str) -> Result<bool, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Ok(false);
        };
        Ok(self.credentials.is_username_taken(&username).await?)
    }

    /// Returns true only if `username` exists and `password` matches its hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Ok(false);
        };
        let Some(password_hash) = self.credentials.password_hash(&username).await? else {
            return Ok(false);
        };

        match verify_password(password, &password_hash) {
            Ok(()) => Ok(true),
            Err(AuthError::PasswordHash) => {
                tracing::warn!(username = %username, "Stored password hash is unreadable");
                Ok(false)
            }
            Err(_) => Ok(false),
        }
    }

    /// Register a new user.
    ///
    /// No password rules are applied; any password, including an empty one,
    /// is accepted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyUsername` if `username` is empty.
    /// Returns `AuthError::DuplicateUsername` if `username` is already registered.
    pub async fn register(&self, username: &str, password: &str) -> Result<Username, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::EmptyUsername)?;

        if self.credentials.is_username_taken(&username).await? {
            return Err(AuthError::DuplicateUsername(username.to_string()));
        }

        let password_hash = self.hash_password(password)?;

        // A concurrent registration can still win between the check and the insert.
        self.credentials
            .insert(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateUsername(username.to_string()),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(username = %username, "User registered");
        Ok(username)
    }

    /// Log in with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<Username, AuthError> {
        if !self.verify(username, password).await? {
            return Err(AuthError::InvalidCredentials);
        }
        Username::parse(username).map_err(|_| AuthError::InvalidCredentials)
    }

    /// Hash a password using the configured Argon2 instance.
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use argon2::{Algorithm, Params, Version};

    use super::*;

    /// Argon2id with minimal cost so tests stay fast.
    pub(crate) fn fast_hasher() -> Argon2<'static> {
        Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            Params::new(1024, 1, 1, None).unwrap(),
        )
    }

    fn service(store: &MemoryCredentialStore) -> AuthService<'_> {
        AuthService::new(store).with_hasher(fast_hasher())
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);

        let alice = auth.register("alice", "pw1").await.unwrap();
        assert_eq!(alice.as_str(), "alice");
        assert!(auth.is_username_taken("alice").await.unwrap());

        let logged_in = auth.login("alice", "pw1").await.unwrap();
        assert_eq!(logged_in, alice);
    }

    #[tokio::test]
    async fn test_register_duplicate_leaves_store_unchanged() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);
        auth.register("alice", "pw1").await.unwrap();

        let err = auth.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername(ref name) if name == "alice"));
        assert_eq!(err.to_string(), "The username alice is already taken!");
        assert_eq!(store.len().await, 1);

        // The first password still works, the rejected one does not.
        assert!(auth.verify("alice", "pw1").await.unwrap());
        assert!(!auth.verify("alice", "other").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_empty_username() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);

        let err = auth.register("", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::EmptyUsername));
        assert_eq!(err.to_string(), "You must enter a username!");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);
        auth.register("alice", "pw1").await.unwrap();

        let err = auth.login("alice", "pw2").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Your login credentials are incorrect!");

        assert!(matches!(
            auth.login("mallory", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("", "").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_verify_requires_exact_username() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);
        auth.register("alice", "pw1").await.unwrap();

        assert!(!auth.verify("Alice", "pw1").await.unwrap());
        assert!(!auth.verify("alice ", "pw1").await.unwrap());
    }

    #[tokio::test]
    async fn test_passwords_are_not_stored_in_plaintext() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);
        let alice = auth.register("alice", "pw1").await.unwrap();

        let stored = store.password_hash(&alice).await.unwrap().unwrap();
        assert_ne!(stored, "pw1");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_empty_password_is_accepted() {
        let store = MemoryCredentialStore::new();
        let auth = service(&store);
        auth.register("nopass", "").await.unwrap();
        assert!(auth.login("nopass", "").await.is_ok());
    }

    #[tokio::test]
    async fn test_unreadable_hash_fails_verification() {
        let store = MemoryCredentialStore::new();
        let alice = Username::parse("alice").unwrap();
        store.insert(&alice, "pw1").await.unwrap();

        let auth = service(&store);
        assert!(!auth.verify("alice", "pw1").await.unwrap());
    }
}
