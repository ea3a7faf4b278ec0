//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public site
//! GET  /                            - Home
//! GET  /services                    - Service list
//! GET  /services/{slug}             - Service detail + inquiry form
//! POST /services/{slug}             - Submit inquiry
//! GET  /blog                        - Published posts
//! GET  /courses                     - Published courses
//! GET  /contact                     - Contact page
//!
//! # Admin auth
//! GET  /admin/login                 - Login page
//! POST /admin/login                 - Login form submission
//! POST /admin/logout                - Logout
//!
//! # Admin (guarded)
//! GET  /admin                       - Dashboard
//! GET  /admin/submissions           - Submissions inbox (?status=&service=)
//! POST /admin/submissions/{id}/status - Change a submission's status
//! GET  /admin/blog                  - Blog manager
//! GET  /admin/courses               - Course manager
//! GET  /admin/services              - Service manager
//!
//! # Anything else
//! *                                 - Redirect to /
//! ```

pub mod auth;
pub mod dashboard;
pub mod public;
pub mod submissions;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Signed-in user as shown in the admin layout.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub username: String,
    pub role: String,
    pub is_admin: bool,
    pub is_editor: bool,
}

impl From<&RequireAdmin> for AdminUserView {
    fn from(admin: &RequireAdmin) -> Self {
        Self {
            username: admin.user.username.clone(),
            role: admin.user.role.to_string(),
            is_admin: admin.is_admin(),
            is_editor: admin.is_editor(),
        }
    }
}

/// Create the public site routes router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::home))
        .route("/services", get(public::services))
        .route(
            "/services/{slug}",
            get(public::service_detail).post(public::submit_inquiry),
        )
        .route("/blog", get(public::blog))
        .route("/courses", get(public::courses))
        .route("/contact", get(public::contact))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/submissions", get(submissions::index))
        .route("/submissions/{id}/status", post(submissions::update_status))
        .route("/blog", get(dashboard::blog_manager))
        .route("/courses", get(dashboard::course_manager))
        .route("/services", get(dashboard::service_manager))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .nest("/admin", admin_routes())
        .fallback(fallback)
}

/// Unknown paths go back to the home page.
async fn fallback() -> Redirect {
    Redirect::to("/")
}
