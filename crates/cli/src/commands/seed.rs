//! Seed the database with user accounts.
//!
//! Reads a YAML list of accounts and registers each one, skipping names that
//! are already taken.
//!
//! ```yaml
//! - username: user
//!   password: pass
//! ```

use std::path::Path;

use tracing::info;

use notetaker_web::db::PgCredentialStore;
use notetaker_web::services::auth::AuthService;
use notetaker_web::services::auth::seed::{parse_users, register_all};

use super::connect;

/// Seed users from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a registration
/// fails for a reason other than the name being taken.
pub async fn users(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading users from file");

    // Read and parse YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed = parse_users(&content)?;

    info!(users = seed.len(), "Parsed seed file");

    let (pool, _) = connect().await?;
    let credentials = PgCredentialStore::new(pool);
    let report = register_all(&AuthService::new(&credentials), &seed).await?;

    info!(
        created = report.created,
        skipped = report.skipped,
        "Seeding complete"
    );
    Ok(())
}
