//! Central reaction to backend authorization failures.
//!
//! Handlers never clear credentials themselves. When an API call answers 401,
//! the handler's `AppError` becomes a redirect to the login page tagged with
//! [`UnauthorizedEvent`]; this middleware sees the tag on the way out, clears
//! the visitor's persisted token and user, and leaves an expiry message for
//! the login page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use crate::error::UnauthorizedEvent;
use crate::session::{SESSION_EXPIRED_MESSAGE, keys};
use crate::state::AppState;

/// Clear the session when a handler reports an authorization failure.
pub async fn clear_on_unauthorized(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if response.extensions().get::<UnauthorizedEvent>().is_some() {
        let mut store = state.session_store(session.clone());
        if let Err(e) = store.handle_unauthorized().await {
            tracing::error!(error = %e, "Failed to clear session after 401");
        }
        if let Err(e) = session
            .insert(keys::FLASH_ERROR, SESSION_EXPIRED_MESSAGE)
            .await
        {
            tracing::warn!(error = %e, "Failed to store login flash message");
        }
    }

    response
}
