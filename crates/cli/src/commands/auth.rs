//! Backend health and session commands.
//!
//! # Usage
//!
//! ```bash
//! agency health
//! AGENCY_PASSWORD=secret agency login -u admin
//! agency whoami
//! agency logout
//! ```

use agency_web::services::{BackendStatus, LoginFlow, LoginForm, LoginState};
use secrecy::SecretString;
use tracing::instrument;

use super::{CliError, Context};

/// Probe the backend health endpoint.
///
/// # Errors
///
/// Returns the API error when the backend is unreachable.
pub async fn health(ctx: &Context) -> Result<(), CliError> {
    match ctx.api.health().await {
        Ok(()) => {
            println!("{} ({})", BackendStatus::Connected.message(), ctx.api.base_url());
            Ok(())
        }
        Err(e) => {
            println!("{} ({})", BackendStatus::Unreachable.message(), ctx.api.base_url());
            Err(e.into())
        }
    }
}

/// Log in and store the token in the session file.
///
/// # Errors
///
/// `Validation` for empty credentials (no call is made), `LoginFailed` when
/// the backend rejects them.
#[instrument(skip(ctx, password))]
pub async fn login(ctx: &Context, username: String, password: SecretString) -> Result<(), CliError> {
    let form = LoginForm { username, password };
    form.validate()?;

    let mut store = ctx.session_store();
    let mut flow = LoginFlow::new();

    flow.submit(&mut store, &form).await?;
    match flow.state() {
        LoginState::Authenticated(user) => {
            println!("Logged in as {} ({})", user.username, user.role);
            println!("Session saved to {}", ctx.storage.path().display());
            Ok(())
        }
        LoginState::Idle | LoginState::Submitting => Err(CliError::LoginFailed(
            flow.error().unwrap_or_default().to_owned(),
        )),
    }
}

/// Forget the stored session.
///
/// # Errors
///
/// Returns an error if the session file cannot be removed.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.session_store().logout().await?;
    println!("Logged out");
    Ok(())
}

/// Show the user the stored token belongs to.
///
/// # Errors
///
/// `NotLoggedIn` or `SessionExpired` when there is no valid session.
pub async fn whoami(ctx: &Context) -> Result<(), CliError> {
    let (store, _token) = ctx.authenticated().await?;
    let Some(user) = store.user() else {
        return Err(CliError::NotLoggedIn);
    };

    println!("{} (id {}, role {})", user.username, user.id, user.role);
    if store.is_admin() {
        println!("Full admin access");
    } else if store.is_editor() {
        println!("Content editing access");
    }
    Ok(())
}
