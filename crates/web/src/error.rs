//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding. An authorization failure from the
//! API becomes a redirect to the login page tagged with [`UnauthorizedEvent`];
//! the `clear_on_unauthorized` middleware reacts to that tag.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::session::StorageError;

/// Response extension marking a backend authorization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnauthorizedEvent;

/// Application-level error type for the web front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// Agency API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Storage(#[from] StorageError),

    /// No such page or record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The form or query could not be accepted.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Something on our side failed; details stay in the logs.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Api(ApiError::Unauthorized { .. }) => StatusCode::SEE_OTHER,
            Self::Api(ApiError::Http { status: 404, .. } | ApiError::InvalidPath(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Api(ApiError::Unauthorized { .. }) = self {
            tracing::info!("Backend rejected the session token, redirecting to login");
            let mut response = Redirect::to("/admin/login").into_response();
            response.extensions_mut().insert(UnauthorizedEvent);
            return response;
        }

        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let message = match &self {
            Self::Storage(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Api(err) => err.user_message(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in user.
pub fn set_sentry_user(user: &agency_core::User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            username: Some(user.username.clone()),
            ..Default::default()
        }));
    });
}

/// Forgets the signed-in user on the error-reporting scope.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("submission 7".to_string());
        assert_eq!(err.to_string(), "Not found: submission 7");

        let err = AppError::BadRequest("unknown status".to_string());
        assert_eq!(err.to_string(), "Bad request: unknown status");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Http {
                status: 500,
                message: None
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Http {
                status: 404,
                message: None
            })),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unauthorized_redirects_with_event() {
        let response = AppError::Api(ApiError::Unauthorized { message: None }).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").map(|v| v.as_bytes()),
            Some(b"/admin/login".as_slice())
        );
        assert!(response.extensions().get::<UnauthorizedEvent>().is_some());
    }

    #[test]
    fn test_tokenless_unauthorized_is_plain_gateway_error() {
        let err = ApiError::Unauthorized {
            message: Some("Invalid token".to_string()),
        }
        .without_session();
        let response = AppError::Api(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.extensions().get::<UnauthorizedEvent>().is_none());
    }

    #[test]
    fn test_refused_path_is_not_found() {
        assert_eq!(
            get_status(AppError::Api(ApiError::InvalidPath("\"..\"".to_string()))),
            StatusCode::NOT_FOUND
        );
    }
}
