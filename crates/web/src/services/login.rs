//! Login form flow.
//!
//! `Idle -> Submitting -> (Idle | Authenticated)`. Empty fields are rejected
//! locally before any network call.

use agency_core::User;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::api::ApiClient;
use crate::session::{LoginOutcome, SessionStore, StorageError, TokenStorage};

/// Local form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both username and password")]
    MissingCredentials,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl LoginForm {
    /// Check that both fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingCredentials` if either field is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() || self.password.expose_secret().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

/// Where the login flow stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    Idle,
    Submitting,
    Authenticated(User),
}

/// Reachability of the backend, shown on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Checking,
    Connected,
    Unreachable,
}

impl BackendStatus {
    /// Probe `GET /health`.
    pub async fn check(api: &ApiClient) -> Self {
        match api.health().await {
            Ok(()) => Self::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                Self::Unreachable
            }
        }
    }

    /// Whether the submit button should be enabled. Advisory only.
    #[must_use]
    pub const fn can_submit(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Banner text for the login page.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Checking => "Checking backend connection...",
            Self::Connected => "Backend connected",
            Self::Unreachable => "Backend not reachable",
        }
    }

    /// CSS modifier for the banner.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Checking => "status-checking",
            Self::Connected => "status-connected",
            Self::Unreachable => "status-unreachable",
        }
    }
}

/// Login form state machine.
#[derive(Debug, Default)]
pub struct LoginFlow {
    state: LoginState,
    error: Option<String>,
}

impl LoginFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit the form through the session store.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting a successful login fails.
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn submit<S: TokenStorage>(
        &mut self,
        store: &mut SessionStore<S>,
        form: &LoginForm,
    ) -> Result<&LoginState, StorageError> {
        self.error = None;

        if let Err(e) = form.validate() {
            self.error = Some(e.to_string());
            self.state = LoginState::Idle;
            return Ok(&self.state);
        }

        self.state = LoginState::Submitting;
        match store.login(&form.username, &form.password).await {
            Ok(LoginOutcome::Success(user)) => {
                self.state = LoginState::Authenticated(user);
            }
            Ok(LoginOutcome::Failure(message)) => {
                self.error = Some(message);
                self.state = LoginState::Idle;
            }
            Err(e) => {
                self.state = LoginState::Idle;
                return Err(e);
            }
        }
        Ok(&self.state)
    }

    #[must_use]
    pub const fn state(&self) -> &LoginState {
        &self.state
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
