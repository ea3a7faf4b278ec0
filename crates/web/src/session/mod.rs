//! Authenticated session lifecycle.
//!
//! A [`SessionStore`] is built per web request (or per CLI invocation) over a
//! [`TokenStorage`] backend. It restores a persisted token by verifying it with
//! the backend, performs login and logout, and reacts to authorization
//! failures by forgetting the credentials.

pub mod storage;

pub use storage::{MemoryStorage, StorageError, TokenStorage, keys};

use agency_core::User;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::api::{ApiClient, ApiError};

/// Shown after a persisted token failed verification.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

/// Shown when the backend rejects a login without its own message.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

/// Snapshot of the session as seen by views.
#[derive(Debug)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<SecretString>,
    /// True until [`SessionStore::initialize`] has completed.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            loading: true,
            error: None,
        }
    }
}

impl SessionState {
    /// Whether the signed-in user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Whether the signed-in user may edit content (editor or admin).
    #[must_use]
    pub fn is_editor(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_editor)
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(User),
    Failure(String),
}

/// Session context for one client.
#[derive(Debug)]
pub struct SessionStore<S> {
    api: ApiClient,
    storage: S,
    state: SessionState,
    initialized: bool,
}

impl<S: TokenStorage> SessionStore<S> {
    /// Create a store in the loading state.
    pub fn new(api: ApiClient, storage: S) -> Self {
        Self {
            api,
            storage,
            state: SessionState::default(),
            initialized: false,
        }
    }

    /// Restore the persisted session.
    ///
    /// With no persisted token this only ends the loading state. Otherwise the
    /// token is verified; any verification failure clears the persisted
    /// credentials and records [`SESSION_EXPIRED_MESSAGE`]. Runs once; later
    /// calls return immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Result<(), StorageError> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        let result = self.restore().await;
        self.state.loading = false;
        result
    }

    async fn restore(&mut self) -> Result<(), StorageError> {
        let Some(token) = self.storage.load_token().await? else {
            return Ok(());
        };
        let token = SecretString::from(token);

        match self.api.verify_token(&token).await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "Restored session");
                self.storage.save(token.expose_secret(), &user).await?;
                self.state.user = Some(user);
                self.state.token = Some(token);
                self.state.error = None;
            }
            Err(e) => {
                tracing::info!(error = %e, "Token verification failed, clearing session");
                self.storage.clear().await?;
                self.state.user = None;
                self.state.token = None;
                self.state.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
            }
        }
        Ok(())
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token and user are persisted. On failure the persisted
    /// state is left untouched and the message is recorded in `error`.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting a successful login fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, StorageError> {
        self.state.error = None;

        match self.api.login(username, password).await {
            Ok(response) => {
                self.storage.save(&response.token, &response.user).await?;
                tracing::info!(username = %response.user.username, role = %response.user.role, "Login succeeded");
                self.state.user = Some(response.user.clone());
                self.state.token = Some(SecretString::from(response.token));
                self.state.loading = false;
                Ok(LoginOutcome::Success(response.user))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                let message = login_failure_message(e);
                self.state.error = Some(message.clone());
                Ok(LoginOutcome::Failure(message))
            }
        }
    }

    /// Forget the credentials. The caller navigates to the login view.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.clear().await?;
        self.state.user = None;
        self.state.token = None;
        self.state.error = None;
        self.state.loading = false;
        Ok(())
    }

    /// React to an authorization failure reported by any API call.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn handle_unauthorized(&mut self) -> Result<(), StorageError> {
        tracing::info!("Authorization rejected by backend, clearing session");
        self.logout().await
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the store, keeping only its state.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.state.token.as_ref()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    #[must_use]
    pub fn is_editor(&self) -> bool {
        self.state.is_editor()
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

/// The backend's own `error` text, or the generic message.
fn login_failure_message(error: ApiError) -> String {
    match error {
        ApiError::Unauthorized {
            message: Some(message),
        }
        | ApiError::Http {
            message: Some(message),
            ..
        } => message,
        _ => LOGIN_FAILED_MESSAGE.to_string(),
    }
}
