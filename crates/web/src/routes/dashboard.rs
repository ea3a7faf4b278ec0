//! Dashboard and content manager route handlers.

use agency_core::{DashboardStats, SubmissionFilter, SubmissionStatus};
use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::AdminUserView;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::services::SubmissionRow;
use crate::session::keys;
use crate::state::AppState;

/// Number of submissions listed on the dashboard.
const RECENT_SUBMISSIONS: usize = 5;

const DASHBOARD_LOAD_ERROR: &str = "Failed to load dashboard data";

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub stats: Option<DashboardStats>,
    pub recent: Vec<SubmissionRow>,
    pub statuses: [SubmissionStatus; 4],
    pub error: Option<String>,
}

/// Placeholder page for content managers not built yet.
#[derive(Template, WebTemplate)]
#[template(path = "admin/placeholder.html")]
pub struct ManagerTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub title: String,
}

/// Dashboard page handler.
///
/// Stats and recent submissions are fetched concurrently. A 401 from either
/// call ends the session; other failures show a banner, as does a flash left
/// by a failed status change.
#[instrument(skip(admin, state, session), fields(user = %admin.user.username))]
pub async fn dashboard(
    admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<DashboardTemplate> {
    let flash: Option<String> = session
        .remove(keys::FLASH_DASHBOARD)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read dashboard flash message");
            None
        });

    let filter = SubmissionFilter::default();
    let (stats_result, submissions_result) = tokio::join!(
        state.api().dashboard_stats(&admin.token),
        state.api().list_submissions(&admin.token, &filter),
    );

    let mut error = flash;

    let stats = match stats_result {
        Ok(stats) => Some(stats),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch dashboard stats");
            error = Some(DASHBOARD_LOAD_ERROR.to_string());
            None
        }
    };

    let recent = match submissions_result {
        Ok(submissions) => submissions
            .iter()
            .take(RECENT_SUBMISSIONS)
            .map(SubmissionRow::from)
            .collect(),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch recent submissions");
            error = Some(DASHBOARD_LOAD_ERROR.to_string());
            Vec::new()
        }
    };

    Ok(DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/admin".to_string(),
        stats,
        recent,
        statuses: SubmissionStatus::ALL,
        error,
    })
}

fn manager(admin: &RequireAdmin, path: &str, title: &str) -> ManagerTemplate {
    ManagerTemplate {
        admin_user: AdminUserView::from(admin),
        current_path: path.to_string(),
        title: title.to_string(),
    }
}

/// Blog manager page.
pub async fn blog_manager(admin: RequireAdmin) -> ManagerTemplate {
    manager(&admin, "/admin/blog", "Blog Manager")
}

/// Course manager page.
pub async fn course_manager(admin: RequireAdmin) -> ManagerTemplate {
    manager(&admin, "/admin/courses", "Course Manager")
}

/// Service manager page.
pub async fn service_manager(admin: RequireAdmin) -> ManagerTemplate {
    manager(&admin, "/admin/services", "Service Manager")
}
