//! Session middleware configuration.
//!
//! Sessions live in process memory: they only hold the visitor's bearer
//! token, the user object and one-shot flash messages, all of which the
//! backend can reissue.

use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "agency_session";

/// Idle lifetime of a session.
const IDLE_TIMEOUT: Duration = Duration::hours(24);

/// Builds the session layer. Cookies are marked `Secure` only when the
/// public base URL is HTTPS.
#[must_use]
pub fn create_session_layer(config: &WebConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(IDLE_TIMEOUT))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
