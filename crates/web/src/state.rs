//! Application state shared across handlers.

use std::sync::Arc;

use argon2::Argon2;
use sqlx::PgPool;

use crate::config::{NotetakerConfig, StorageConfig};
use crate::db::{self, PgCredentialStore, PgNoteStore, RepositoryError};
use crate::services::auth::seed::{self, SeedError};
use crate::services::auth::{AuthService, CredentialStore, MemoryCredentialStore};
use crate::services::notes::{MemoryNoteStore, NoteStore};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database connection failed: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("note store setup failed: {0}")]
    NoteStore(#[from] RepositoryError),
    #[error("demo accounts could not be loaded: {0}")]
    DemoAccounts(#[from] SeedError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The stores are chosen once at
/// startup and handed to every handler through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: NotetakerConfig,
    notes: Arc<dyn NoteStore>,
    credentials: Arc<dyn CredentialStore>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create application state from explicit stores.
    ///
    /// # Arguments
    ///
    /// * `config` - Notetaker configuration
    /// * `notes` - Note store used by every note route
    /// * `credentials` - Credential store used by login and registration
    /// * `pool` - `PostgreSQL` pool, if the stores use one (for readiness checks)
    #[must_use]
    pub fn new(
        config: NotetakerConfig,
        notes: Arc<dyn NoteStore>,
        credentials: Arc<dyn CredentialStore>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                notes,
                credentials,
                pool,
            }),
        }
    }

    /// Create application state backed by process memory.
    #[must_use]
    pub fn in_memory(config: NotetakerConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryNoteStore::new()),
            Arc::new(MemoryCredentialStore::new()),
            None,
        )
    }

    /// Create in-memory state whose credential store starts with the bundled
    /// demo accounts, hashed with `hasher`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled seed file cannot be registered.
    pub async fn in_memory_with_demo_accounts(
        config: NotetakerConfig,
        hasher: Argon2<'static>,
    ) -> Result<Self, StateError> {
        let credentials = MemoryCredentialStore::new();
        let report =
            seed::register_demo_accounts(&AuthService::new(&credentials).with_hasher(hasher))
                .await?;
        tracing::info!(accounts = report.created, "Demo accounts loaded");

        Ok(Self::new(
            config,
            Arc::new(MemoryNoteStore::new()),
            Arc::new(credentials),
            None,
        ))
    }

    /// Create application state for the storage backend named in `config`.
    ///
    /// The in-memory backend starts with the demo accounts; the persistent one
    /// uses whatever the database holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or the configured
    /// notes table name is invalid.
    pub async fn from_config(config: NotetakerConfig) -> Result<Self, StateError> {
        let (database_url, notes_table) = match &config.storage {
            StorageConfig::Memory => {
                tracing::warn!("No database configured; notes and accounts live in memory only");
                return Self::in_memory_with_demo_accounts(config, Argon2::default()).await;
            }
            StorageConfig::Postgres {
                database_url,
                notes_table,
            } => (database_url.clone(), notes_table.clone()),
        };

        let pool = db::create_pool(&database_url).await?;
        tracing::info!(table = %notes_table, "Database pool created");

        let notes = PgNoteStore::new(pool.clone(), notes_table)?;
        let credentials = PgCredentialStore::new(pool.clone());

        Ok(Self::new(
            config,
            Arc::new(notes),
            Arc::new(credentials),
            Some(pool),
        ))
    }

    /// Get a reference to the notetaker configuration.
    #[must_use]
    pub fn config(&self) -> &NotetakerConfig {
        &self.inner.config
    }

    /// Get the active note store.
    #[must_use]
    pub fn notes(&self) -> &dyn NoteStore {
        self.inner.notes.as_ref()
    }

    /// Get the active credential store.
    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.inner.credentials.as_ref()
    }

    /// Get the database connection pool, if the persistent backend is active.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::services::auth::tests::fast_hasher;

    fn test_config() -> NotetakerConfig {
        NotetakerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%".to_string()),
            storage: StorageConfig::Memory,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_starts_empty() {
        let state = AppState::in_memory(test_config());
        let auth = AuthService::new(state.credentials());
        assert!(!auth.is_username_taken("user").await.unwrap());
        assert!(state.pool().is_none());
    }

    #[tokio::test]
    async fn test_demo_accounts_are_loaded() {
        let state = AppState::in_memory_with_demo_accounts(test_config(), fast_hasher())
            .await
            .unwrap();
        let auth = AuthService::new(state.credentials());

        assert!(auth.verify("user", "pass").await.unwrap());
        assert!(auth.verify("username", "password").await.unwrap());
        assert!(auth.verify("abc", "123").await.unwrap());
        assert!(
            state
                .notes()
                .list_by_owner(&notetaker_core::Username::parse("user").unwrap())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
