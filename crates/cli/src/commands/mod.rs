//! CLI command implementations.
//!
//! Every command builds its own [`SessionStore`] over the session file, so
//! the CLI goes through exactly the same restore, login and unauthorized
//! handling as the web front end.

pub mod auth;
pub mod submissions;

use agency_web::api::{ApiClient, ApiError};
use agency_web::services::ValidationError;
use agency_web::session::{SessionStore, StorageError};
use secrecy::SecretString;
use thiserror::Error;

use crate::storage::FileStorage;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Agency API call failed.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// Session file could not be read or written.
    #[error("Session file error: {0}")]
    Storage(#[from] StorageError),

    /// Local input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No token is stored.
    #[error("Not logged in. Run `agency login -u <username>` first.")]
    NotLoggedIn,

    /// The stored token was rejected; the session file has been cleared.
    #[error("Session expired. Please login again with `agency login -u <username>`.")]
    SessionExpired,

    /// The backend rejected the credentials.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// A command-line value could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No session file path was given and `$HOME` is unset.
    #[error("Cannot locate the session file: set HOME or pass --session-file")]
    NoSessionFile,
}

/// Shared inputs of every command.
pub struct Context {
    pub api: ApiClient,
    pub storage: FileStorage,
}

impl Context {
    /// A fresh session store over the session file.
    #[must_use]
    pub fn session_store(&self) -> SessionStore<FileStorage> {
        SessionStore::new(self.api.clone(), self.storage.clone())
    }

    /// Restore the stored session and return its token.
    ///
    /// # Errors
    ///
    /// `NotLoggedIn` when nothing is stored, `SessionExpired` when the stored
    /// token no longer verifies.
    pub async fn authenticated(
        &self,
    ) -> Result<(SessionStore<FileStorage>, SecretString), CliError> {
        let mut store = self.session_store();
        store.initialize().await?;

        if store.state().error.is_some() {
            return Err(CliError::SessionExpired);
        }
        let token = store.token().cloned().ok_or(CliError::NotLoggedIn)?;
        Ok((store, token))
    }
}

/// Turn an API error from an authenticated call into a `CliError`.
///
/// A 401 clears the session file and becomes `SessionExpired`.
pub async fn api_failure(store: &mut SessionStore<FileStorage>, error: ApiError) -> CliError {
    if error.is_unauthorized() {
        if let Err(e) = store.handle_unauthorized().await {
            return e.into();
        }
        return CliError::SessionExpired;
    }
    error.into()
}
