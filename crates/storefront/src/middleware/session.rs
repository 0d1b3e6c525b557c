//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! cookie is signed with a key derived from `STOREFRONT_SESSION_SECRET`, so a
//! tampered or forged session id is ignored.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Cookie signing key. The secret is stretched to the 64 bytes the key
/// needs with SHA-512.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer with `PostgreSQL` store and signed cookies.
///
/// The `tower_sessions.session` table is created by the store migrations.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_signed(signing_key(&config.session_secret))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::{Cookie, CookieJar};

    use super::*;

    #[test]
    fn test_signing_key_is_stable_per_secret() {
        let secret = SecretString::from("kT9#vQ2!mZ7@pL4$wR8%nB1^xC6&yD3*");
        let other = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!");

        assert_eq!(signing_key(&secret).master(), signing_key(&secret).master());
        assert_ne!(signing_key(&secret).master(), signing_key(&other).master());
    }

    #[test]
    fn test_signed_cookie_rejects_other_key() {
        let key = signing_key(&SecretString::from("kT9#vQ2!mZ7@pL4$wR8%nB1^xC6&yD3*"));
        let other = signing_key(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!"));

        let mut jar = CookieJar::new();
        jar.signed_mut(&key)
            .add(Cookie::new(SESSION_COOKIE_NAME, "session-id"));
        let signed = jar.get(SESSION_COOKIE_NAME).unwrap().clone();
        assert_ne!(signed.value(), "session-id");

        let mut verify = CookieJar::new();
        verify.add_original(signed.clone());
        assert_eq!(
            verify.signed(&key).get(SESSION_COOKIE_NAME).unwrap().value(),
            "session-id"
        );
        assert!(verify.signed(&other).get(SESSION_COOKIE_NAME).is_none());
    }
}
