//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::api::{ApiClient, ApiError};
use crate::config::WebConfig;
use crate::session::SessionStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Nothing per-visitor lives
/// here; session data stays in each visitor's session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url, config.api_timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the agency API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Build an uninitialized session store over a visitor's session.
    #[must_use]
    pub fn session_store(&self, session: Session) -> SessionStore<Session> {
        SessionStore::new(self.inner.api.clone(), session)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("api", &self.inner.api)
            .finish()
    }
}
