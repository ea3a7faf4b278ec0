//! Dashboard statistics.

use serde::{Deserialize, Serialize};

/// Submission counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionCounts {
    pub total: u64,
    pub new: u64,
    pub reviewed: u64,
}

/// Counters for published content (posts, courses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentCounts {
    pub total: u64,
    pub published: u64,
    pub drafts: u64,
}

/// Statistics shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub submissions: SubmissionCounts,
    pub posts: ContentCounts,
    pub courses: ContentCounts,
}
