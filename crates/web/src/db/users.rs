//! Credential repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;

use notetaker_core::Username;

use super::RepositoryError;
use crate::services::auth::CredentialStore;

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new credential store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn is_username_taken(&self, username: &Username) -> Result<bool, RepositoryError> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn password_hash(&self, username: &Username) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(hash,)| hash))
    }

    async fn insert(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("username already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::schema::ensure_schema;
    use crate::services::auth::{AuthError, AuthService};
    use notetaker_core::NoteId;

    async fn store() -> PgCredentialStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.unwrap();
        ensure_schema(&pool, "notes_test").await.unwrap();
        PgCredentialStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database (DATABASE_URL)"]
    async fn test_pg_register_login_and_duplicate() {
        let store = store().await;
        let auth = AuthService::new(&store)
            .with_hasher(crate::services::auth::tests::fast_hasher());
        let name = format!("alice-{}", NoteId::generate());

        auth.register(&name, "pw1").await.unwrap();
        assert!(auth.login(&name, "pw1").await.is_ok());
        assert!(matches!(
            auth.register(&name, "pw2").await,
            Err(AuthError::DuplicateUsername(_))
        ));
        assert!(matches!(
            auth.login(&name, "pw2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database (DATABASE_URL)"]
    async fn test_pg_insert_conflict() {
        let store = store().await;
        let name = Username::parse(&format!("bob-{}", NoteId::generate())).unwrap();

        store.insert(&name, "hash").await.unwrap();
        assert!(matches!(
            store.insert(&name, "hash").await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(store.is_username_taken(&name).await.unwrap());
    }
}
