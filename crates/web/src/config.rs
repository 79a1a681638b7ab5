//! Notetaker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NOTETAKER_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `NOTETAKER_HOST` - Bind address (default: 127.0.0.1)
//! - `NOTETAKER_PORT` - Listen port (default: 5000)
//! - `NOTETAKER_BASE_URL` - Public URL (default: <http://localhost:5000>)
//! - `NOTETAKER_DATABASE_URL` - `PostgreSQL` connection string; selects the
//!   persistent note store (falls back to `DATABASE_URL`)
//! - `NOTETAKER_NOTES_TABLE` - Table holding notes (default: notes)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Without a database URL the application runs on the in-memory stores and
//! loses all notes and accounts on restart.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Postgres caps identifiers at 63 bytes.
const MAX_TABLE_NAME_LENGTH: usize = 63;

/// Default name of the notes table.
pub const DEFAULT_NOTES_TABLE: &str = "notes";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where notes and credentials are kept.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Process memory; lost on restart.
    Memory,
    /// `PostgreSQL` tables.
    Postgres {
        /// Connection string (contains password)
        database_url: SecretString,
        /// Name of the notes table
        notes_table: String,
    },
}

/// Notetaker application configuration.
#[derive(Debug, Clone)]
pub struct NotetakerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Note and credential storage backend
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl NotetakerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("NOTETAKER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("NOTETAKER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("NOTETAKER_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("NOTETAKER_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("NOTETAKER_BASE_URL", "http://localhost:5000");
        let session_secret = get_validated_secret("NOTETAKER_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "NOTETAKER_SESSION_SECRET")?;

        let storage = StorageConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            storage,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns true when cookies must carry the `Secure` flag.
    #[must_use]
    pub fn uses_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl StorageConfig {
    /// Read only the storage variables.
    ///
    /// Used by tools that touch the database but never serve requests, so
    /// they do not need a session secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the notes table name is not a
    /// plain identifier.
    pub fn from_env() -> Result<Self, ConfigError> {
        let Some(database_url) = get_database_url("NOTETAKER_DATABASE_URL") else {
            return Ok(Self::Memory);
        };

        let notes_table = get_env_or_default("NOTETAKER_NOTES_TABLE", DEFAULT_NOTES_TABLE);
        validate_table_name(&notes_table)
            .map_err(|msg| ConfigError::InvalidEnvVar("NOTETAKER_NOTES_TABLE".to_string(), msg))?;

        Ok(Self::Postgres {
            database_url,
            notes_table,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Check that a table name is a plain, unquoted SQL identifier.
///
/// The name is interpolated into statements, so nothing outside
/// `[A-Za-z_][A-Za-z0-9_]*` is allowed.
///
/// # Errors
///
/// Returns a description of the problem.
pub fn validate_table_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("table name cannot be empty".to_string());
    };
    if name.len() > MAX_TABLE_NAME_LENGTH {
        return Err(format!(
            "table name must be at most {MAX_TABLE_NAME_LENGTH} characters"
        ));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err("table name must start with a letter or underscore".to_string());
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("table name may only contain letters, digits and underscores".to_string());
    }
    Ok(())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
