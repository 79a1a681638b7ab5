//! Session middleware configuration.
//!
//! Sets up signed-cookie sessions using tower-sessions. The cookie only
//! carries the session ID and its signature; the identity record lives in the
//! session store.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::NotetakerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "myappcookies";

/// Session expiry time in seconds (15 minutes from the last write to the session).
pub const SESSION_EXPIRY_SECONDS: i64 = 15 * 60;

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `store` - Session store (`MemoryStore` or `PostgresStore`)
/// * `config` - Notetaker configuration (for session secret and base URL)
#[must_use]
pub fn create_session_layer<S>(
    store: S,
    config: &NotetakerConfig,
) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(config.uses_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config.session_secret.expose_secret()))
}

/// Derive the 64-byte cookie signing key from the configured secret.
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_deterministic() {
        let a = signing_key("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6");
        let b = signing_key("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6");
        let c = signing_key("zC6^uW4*rT0&pQ7#nL5@mK2!xY9$aB3");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
