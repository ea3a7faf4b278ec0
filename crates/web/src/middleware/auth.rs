//! Authentication extractors for the admin pages.
//!
//! Each request builds its own [`SessionStore`] over the visitor's session and
//! initializes it (verifying any persisted token) before the guard decides.
//! Because of that, request handling never sees [`GuardDecision::Pending`];
//! that decision and [`PendingTemplate`] serve stores that are consulted
//! before their restore has finished, and are exercised by the unit tests
//! below.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(admin: RequireAdmin) -> impl IntoResponse {
//!     format!("Hello, {}!", admin.user.username)
//! }
//! ```

use agency_core::User;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::filters;
use crate::session::{SessionState, SessionStore, keys};
use crate::state::AppState;

/// Outcome of the route guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restore still in progress.
    Pending,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Render the protected view for this user.
    Allow(User),
}

/// Decide what a protected route shows for a session state.
#[must_use]
pub fn guard(state: &SessionState) -> GuardDecision {
    if state.loading {
        return GuardDecision::Pending;
    }
    match &state.user {
        Some(user) => GuardDecision::Allow(user.clone()),
        None => GuardDecision::RedirectToLogin,
    }
}

/// Interim page shown while the session is being restored.
///
/// Not reachable through [`RequireAdmin`], which restores first.
#[derive(Template, WebTemplate)]
#[template(path = "auth/pending.html")]
pub struct PendingTemplate {
    pub refresh_secs: u32,
}

/// Error returned when admin authentication is required but not present.
pub enum AuthRejection {
    /// Session not ready yet; show the pending page.
    Pending,
    /// Redirect to the login page.
    RedirectToLogin,
    /// No session layer or broken session storage.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Pending => PendingTemplate { refresh_secs: 1 }.into_response(),
            Self::RedirectToLogin => Redirect::to("/admin/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Extractor yielding the visitor's initialized session store.
///
/// Never redirects; used by pages that behave differently for signed-in
/// visitors (the login page).
pub struct CurrentSession(pub SessionStore<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;

        let mut store = app_state.session_store(session);
        store.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to restore session");
            AuthRejection::Unauthorized
        })?;

        Ok(Self(store))
    }
}

/// Extractor that requires a signed-in user.
///
/// If the persisted token no longer verifies, the session is cleared and the
/// visitor is redirected to the login page with an expiry message.
pub struct RequireAdmin {
    pub user: User,
    pub token: SecretString,
}

impl RequireAdmin {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    #[must_use]
    pub fn is_editor(&self) -> bool {
        self.user.is_editor()
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(store) = CurrentSession::from_request_parts(parts, state).await?;

        match guard(store.state()) {
            GuardDecision::Pending => Err(AuthRejection::Pending),
            GuardDecision::RedirectToLogin => {
                if let Some(message) = &store.state().error {
                    // Shown once by the login page
                    if let Err(e) = store.storage().insert(keys::FLASH_ERROR, message).await {
                        tracing::warn!(error = %e, "Failed to store login flash message");
                    }
                }
                Err(AuthRejection::RedirectToLogin)
            }
            GuardDecision::Allow(user) => {
                let token = store
                    .into_state()
                    .token
                    .ok_or(AuthRejection::RedirectToLogin)?;
                set_sentry_user(&user);
                Ok(Self { user, token })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use agency_core::{Role, UserId};

    use super::*;

    fn admin() -> User {
        User {
            id: UserId::new(1),
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_guard_pending_while_loading() {
        let state = SessionState::default();
        assert_eq!(guard(&state), GuardDecision::Pending);

        // Loading wins even if a user is already known
        let state = SessionState {
            user: Some(admin()),
            ..SessionState::default()
        };
        assert_eq!(guard(&state), GuardDecision::Pending);
    }

    #[test]
    fn test_guard_redirects_without_user() {
        let state = SessionState {
            loading: false,
            ..SessionState::default()
        };
        assert_eq!(guard(&state), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn test_guard_allows_user() {
        let state = SessionState {
            loading: false,
            user: Some(admin()),
            token: Some(SecretString::from("T")),
            error: None,
        };
        assert_eq!(guard(&state), GuardDecision::Allow(admin()));
    }

    #[test]
    fn test_rejection_responses() {
        assert_eq!(
            AuthRejection::Pending.into_response().status(),
            StatusCode::OK
        );
        assert_eq!(
            AuthRejection::RedirectToLogin.into_response().status(),
            StatusCode::SEE_OTHER
        );
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
