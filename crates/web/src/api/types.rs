//! Request and response bodies for the agency API.

use agency_core::{DashboardStats, SubmissionStatus, User};
use serde::{Deserialize, Serialize};

/// Body of `POST /admin/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /admin/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Response of `POST /admin/verify-token`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub user: User,
}

/// Response of `GET /admin/dashboard/stats`.
///
/// Some backend versions wrap the counters in a `stats` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Wrapped { stats: DashboardStats },
    Bare(DashboardStats),
}

impl From<StatsResponse> for DashboardStats {
    fn from(response: StatsResponse) -> Self {
        match response {
            StatsResponse::Wrapped { stats } | StatsResponse::Bare(stats) => stats,
        }
    }
}

/// Body of `PUT /admin/submissions/{id}`.
#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: SubmissionStatus,
}

/// A list endpoint response, either a bare array or an object holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "submissions",
            alias = "services",
            alias = "posts",
            alias = "courses"
        )]
        items: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    /// Unwrap into the list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}

/// A service as listed by `GET /services`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceListing {
    pub slug: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A published blog post summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostSummary {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "summary")]
    pub excerpt: Option<String>,
}

/// A published course summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseSummary {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_accepts_both_shapes() {
        let wrapped: StatsResponse =
            serde_json::from_str(r#"{"stats": {"submissions": {"total": 3}}}"#).unwrap();
        assert_eq!(DashboardStats::from(wrapped).submissions.total, 3);

        let bare: StatsResponse =
            serde_json::from_str(r#"{"submissions": {"total": 5}, "posts": {"drafts": 1}}"#)
                .unwrap();
        let stats = DashboardStats::from(bare);
        assert_eq!(stats.submissions.total, 5);
        assert_eq!(stats.posts.drafts, 1);
    }

    #[test]
    fn test_list_response_accepts_both_shapes() {
        let bare: ListResponse<ServiceListing> =
            serde_json::from_str(r#"[{"slug": "web-creation", "name": "Web Creation"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: ListResponse<ServiceListing> = serde_json::from_str(
            r#"{"services": [{"slug": "graphic-design", "title": "Graphic Design"}]}"#,
        )
        .unwrap();
        let services = wrapped.into_vec();
        assert_eq!(services[0].name, "Graphic Design");
    }

    #[test]
    fn test_status_update_body() {
        let body = serde_json::to_value(StatusUpdate {
            status: SubmissionStatus::Contacted,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "contacted"}));
    }
}
