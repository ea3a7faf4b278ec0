//! Submissions inbox route handlers.

use agency_core::{
    KNOWN_SERVICES, ServiceFilter, ServiceInfo, StatusFilter, SubmissionFilter, SubmissionId,
    SubmissionStatus,
};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::AdminUserView;
use crate::api::ApiError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::services::{SubmissionRow, SubmissionsView};
use crate::session::keys;
use crate::state::AppState;

// =============================================================================
// Query / Form Types
// =============================================================================

/// Inbox filter as it arrives in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub service: Option<String>,
}

impl FilterQuery {
    fn parse(&self) -> Result<SubmissionFilter> {
        parse_filter(self.status.as_deref(), self.service.as_deref())
    }
}

/// Status change form. Carries the inbox filter so the refetch uses it.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub filter_status: Option<String>,
    #[serde(default)]
    pub filter_service: Option<String>,
    /// `dashboard` when posted from the dashboard.
    #[serde(default)]
    pub return_to: Option<String>,
}

fn parse_filter(status: Option<&str>, service: Option<&str>) -> Result<SubmissionFilter> {
    let status = status
        .unwrap_or_default()
        .parse::<StatusFilter>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let service = ServiceFilter::parse(service.unwrap_or_default());
    Ok(SubmissionFilter { status, service })
}

// =============================================================================
// Templates
// =============================================================================

/// Submissions inbox template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/submissions.html")]
pub struct SubmissionsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub rows: Vec<SubmissionRow>,
    pub filter_status: String,
    pub filter_service: String,
    pub statuses: [SubmissionStatus; 4],
    pub services: &'static [ServiceInfo],
    pub error: Option<String>,
}

impl SubmissionsTemplate {
    fn new(admin: &RequireAdmin, view: &SubmissionsView<'_>, error: Option<String>) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: "/admin/submissions".to_string(),
            rows: view.rows(),
            filter_status: view.filter().status.as_str().to_string(),
            filter_service: view.filter().service.as_str().to_string(),
            statuses: SubmissionStatus::ALL,
            services: KNOWN_SERVICES,
            error,
        }
    }
}

/// Split an API error into "end the session" and "show a banner".
fn banner(error: ApiError) -> Result<String> {
    if error.is_unauthorized() {
        return Err(error.into());
    }
    Ok(error.user_message())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Submissions inbox.
#[instrument(skip(admin, state))]
pub async fn index(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<SubmissionsTemplate> {
    let filter = query.parse()?;
    let mut view = SubmissionsView::new(state.api(), &admin.token, filter);

    let error = match view.fetch().await {
        Ok(_) => None,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch submissions");
            Some(banner(e)?)
        }
    };

    Ok(SubmissionsTemplate::new(&admin, &view, error))
}

/// Change a submission's status, then show the refreshed list.
///
/// Changes posted from the dashboard go back there, with any failure carried
/// over as a flash banner.
#[instrument(skip(admin, state, session, form), fields(status = %form.status))]
pub async fn update_status(
    admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<SubmissionId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status = form
        .status
        .parse::<SubmissionStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if form.return_to.as_deref() == Some("dashboard") {
        match state.api().update_submission(&admin.token, id, status).await {
            Ok(_) => tracing::info!(%id, %status, "Submission status updated"),
            Err(e) => {
                tracing::error!(error = %e, %id, "Failed to update submission");
                let message = banner(e)?;
                if let Err(e) = session.insert(keys::FLASH_DASHBOARD, message).await {
                    tracing::warn!(error = %e, "Failed to store dashboard flash message");
                }
            }
        }
        return Ok(Redirect::to("/admin").into_response());
    }

    let filter = parse_filter(form.filter_status.as_deref(), form.filter_service.as_deref())?;
    let mut view = SubmissionsView::new(state.api(), &admin.token, filter);

    let error = match view.update_status(id, status).await {
        Ok(_) => {
            tracing::info!(%id, %status, "Submission status updated");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, %id, "Failed to update submission");
            Some(banner(e)?)
        }
    };

    Ok(SubmissionsTemplate::new(&admin, &view, error).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(None, None).unwrap();
        assert!(!filter.is_filtered());

        let filter = parse_filter(Some("all"), Some("all")).unwrap();
        assert!(!filter.is_filtered());

        let filter = parse_filter(Some("reviewed"), Some("web-creation")).unwrap();
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("status", "reviewed".to_string()),
                ("service", "web-creation".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_filter_rejects_unknown_status() {
        assert!(matches!(
            parse_filter(Some("spam"), None),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_unauthorized_is_not_a_banner() {
        assert!(banner(ApiError::Unauthorized { message: None }).is_err());
        assert_eq!(
            banner(ApiError::Http {
                status: 500,
                message: Some("Database unavailable".to_string())
            })
            .unwrap(),
            "Database unavailable"
        );
    }
}
