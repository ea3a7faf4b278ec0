//! Admin login and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentSession;
use crate::services::{BackendStatus, LoginFlow, LoginForm, LoginState};
use crate::session::keys;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub username: String,
    /// Pre-filled password (demo credentials only).
    pub password: String,
    pub error: Option<String>,
    pub backend: BackendStatus,
    pub demo_enabled: bool,
}

impl LoginTemplate {
    fn new(state: &AppState, backend: BackendStatus) -> Self {
        let demo = state.config().demo.as_ref();
        Self {
            username: demo.map(|d| d.username.clone()).unwrap_or_default(),
            password: demo
                .map(|d| d.password.expose_secret().to_string())
                .unwrap_or_default(),
            error: None,
            backend,
            demo_enabled: demo.is_some(),
        }
    }
}

/// Display the login page.
///
/// Signed-in visitors go straight to the dashboard.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    CurrentSession(store): CurrentSession,
) -> Result<Response> {
    if store.user().is_some() {
        return Ok(Redirect::to("/admin").into_response());
    }

    let flash: Option<String> = store.storage().remove(keys::FLASH_ERROR).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read login flash message");
        None
    });

    let backend = BackendStatus::check(state.api()).await;
    let mut template = LoginTemplate::new(&state, backend);
    template.error = flash.or_else(|| store.state().error.clone());

    Ok(template.into_response())
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    CurrentSession(mut store): CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let mut flow = LoginFlow::new();

    if let LoginState::Authenticated(_) = flow.submit(&mut store, &form).await? {
        return Ok(Redirect::to("/admin").into_response());
    }

    let backend = BackendStatus::check(state.api()).await;
    let mut template = LoginTemplate::new(&state, backend);
    template.username = form.username;
    template.password = String::new();
    template.error = flow.error().map(str::to_owned);

    Ok(template.into_response())
}

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut store = state.session_store(session);
    store.logout().await?;
    crate::error::clear_sentry_user();

    Ok(Redirect::to("/admin/login"))
}
