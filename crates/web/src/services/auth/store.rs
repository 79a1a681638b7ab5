//! Credential storage.

use async_trait::async_trait;
use tokio::sync::Mutex;

use notetaker_core::Username;

use crate::db::RepositoryError;

/// Backend holding username / password-hash pairs.
///
/// Implementations only store and look up; hashing and the registration
/// rules live in [`AuthService`](super::AuthService).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns true if a credential exists for `username`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    async fn is_username_taken(&self, username: &Username) -> Result<bool, RepositoryError>;

    /// The stored PHC hash for `username`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    async fn password_hash(&self, username: &Username) -> Result<Option<String>, RepositoryError>;

    /// Store a new credential.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    async fn insert(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;
}

#[derive(Debug)]
struct StoredCredential {
    username: Username,
    password_hash: String,
}

/// Credential store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Vec<StoredCredential>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub async fn len(&self) -> usize {
        self.credentials.lock().await.len()
    }

    /// Returns true if no credentials are stored.
    pub async fn is_empty(&self) -> bool {
        self.credentials.lock().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn is_username_taken(&self, username: &Username) -> Result<bool, RepositoryError> {
        Ok(self
            .credentials
            .lock()
            .await
            .iter()
            .any(|c| &c.username == username))
    }

    async fn password_hash(&self, username: &Username) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .credentials
            .lock()
            .await
            .iter()
            .find(|c| &c.username == username)
            .map(|c| c.password_hash.clone()))
    }

    async fn insert(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut credentials = self.credentials.lock().await;
        if credentials.iter().any(|c| &c.username == username) {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }
        credentials.push(StoredCredential {
            username: username.clone(),
            password_hash: password_hash.to_owned(),
        });
        Ok(())
    }
}
