//! Account seeding.
//!
//! Registers a list of accounts through [`AuthService`], skipping names that
//! are already taken. The demo accounts in `seed/users.yaml` are loaded into
//! the in-memory credential store at startup and can be written to
//! `PostgreSQL` with `notetaker-cli seed users`.
//!
//! ```yaml
//! - username: user
//!   password: pass
//! ```

use serde::Deserialize;
use thiserror::Error;

use super::{AuthError, AuthService};

/// The bundled demo accounts.
pub const DEMO_USERS_YAML: &str = include_str!("../../../../../seed/users.yaml");

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file is not a list of accounts.
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A registration failed for a reason other than a taken name.
    #[error("seeding failed: {0}")]
    Auth(#[from] AuthError),
}

/// One account in a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Parse a seed file.
///
/// # Errors
///
/// Returns an error if the YAML does not describe a list of accounts.
pub fn parse_users(content: &str) -> Result<Vec<SeedUser>, SeedError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Register every account in `users`.
///
/// Taken and empty usernames are skipped.
///
/// # Errors
///
/// Returns `SeedError::Auth` if the credential store fails.
pub async fn register_all(
    auth: &AuthService<'_>,
    users: &[SeedUser],
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    for user in users {
        match auth.register(&user.username, &user.password).await {
            Ok(username) => {
                tracing::info!(username = %username, "Created user");
                report.created += 1;
            }
            Err(AuthError::DuplicateUsername(name)) => {
                tracing::info!(username = %name, "User already exists, skipping");
                report.skipped += 1;
            }
            Err(AuthError::EmptyUsername) => {
                tracing::warn!("Skipping seed entry with empty username");
                report.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(report)
}

/// Register the bundled demo accounts.
///
/// # Errors
///
/// Returns an error if the bundled file is malformed or the store fails.
pub async fn register_demo_accounts(auth: &AuthService<'_>) -> Result<SeedReport, SeedError> {
    let users = parse_users(DEMO_USERS_YAML)?;
    register_all(auth, &users).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::auth::MemoryCredentialStore;
    use crate::services::auth::tests::fast_hasher;

    #[test]
    fn test_parse_bundled_seed_file() {
        let users = parse_users(DEMO_USERS_YAML).unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["user", "username", "abc"]);
        assert_eq!(users[2].password, "123");
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert!(matches!(
            parse_users("username: user"),
            Err(SeedError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_demo_accounts_can_log_in() {
        let store = MemoryCredentialStore::new();
        let auth = AuthService::new(&store).with_hasher(fast_hasher());

        let report = register_demo_accounts(&auth).await.unwrap();
        assert_eq!(report, SeedReport { created: 3, skipped: 0 });

        assert!(auth.login("user", "pass").await.is_ok());
        assert!(auth.login("username", "password").await.is_ok());
        assert!(auth.login("abc", "123").await.is_ok());
        assert!(auth.login("abc", "pass").await.is_err());
    }

    #[tokio::test]
    async fn test_seeding_twice_skips_existing() {
        let store = MemoryCredentialStore::new();
        let auth = AuthService::new(&store).with_hasher(fast_hasher());
        register_demo_accounts(&auth).await.unwrap();

        let users = parse_users(
            r"
- username: user
  password: other
- username: ''
  password: x
- username: new
  password: pw
",
        )
        .unwrap();
        let report = register_all(&auth, &users).await.unwrap();

        assert_eq!(report, SeedReport { created: 1, skipped: 2 });
        assert_eq!(store.len().await, 4);
        assert!(auth.login("user", "pass").await.is_ok());
    }
}
