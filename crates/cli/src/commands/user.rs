//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! notetaker-cli user create -u alice -p hunter2
//! ```

use notetaker_web::db::PgCredentialStore;
use notetaker_web::services::auth::AuthService;

use super::connect;

/// Register a new user against the persistent credential store.
///
/// # Errors
///
/// Returns an error if the database is not configured, the username is empty
/// or already taken, or the insert fails.
pub async fn create(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (pool, _) = connect().await?;
    let credentials = PgCredentialStore::new(pool);

    let username = AuthService::new(&credentials)
        .register(username, password)
        .await?;

    tracing::info!(username = %username, "User created");
    Ok(())
}
