//! Admin submissions inbox.
//!
//! Holds the active filter and the last fetched list. Every status change is
//! followed by exactly one refetch with the filter in force at that moment.

use agency_core::{Submission, SubmissionFilter, SubmissionId, SubmissionStatus};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::instrument;

use crate::api::{ApiClient, ApiError};

/// Display format for submission timestamps, e.g. `Jan 5, 2025, 03:30 PM`.
const DATE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// Presentation of a status: label and CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub class: &'static str,
}

impl StatusBadge {
    #[must_use]
    pub const fn for_status(status: SubmissionStatus) -> Self {
        match status {
            SubmissionStatus::New => Self {
                label: "New",
                class: "badge badge-new",
            },
            SubmissionStatus::Reviewed => Self {
                label: "Reviewed",
                class: "badge badge-reviewed",
            },
            SubmissionStatus::Contacted => Self {
                label: "Contacted",
                class: "badge badge-contacted",
            },
            SubmissionStatus::Archived => Self {
                label: "Archived",
                class: "badge badge-archived",
            },
        }
    }

    /// Badge for a raw status value; unknown values look like `new`.
    #[must_use]
    pub fn for_raw(raw: &str) -> Self {
        Self::for_status(SubmissionStatus::from_raw_lossy(raw))
    }
}

/// Format a timestamp for the inbox.
#[must_use]
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// One inbox row, ready for a template.
#[derive(Debug, Clone)]
pub struct SubmissionRow {
    pub id: SubmissionId,
    pub full_name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: String,
    pub message: String,
    pub status: SubmissionStatus,
    pub badge: StatusBadge,
    pub created: String,
}

impl From<&Submission> for SubmissionRow {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id,
            full_name: submission.full_name.clone(),
            email: submission.email.clone(),
            company: submission.company().map(str::to_owned),
            phone: submission.phone.clone().filter(|p| !p.trim().is_empty()),
            service: submission.service_name().to_owned(),
            message: submission.message.clone(),
            status: submission.status,
            badge: StatusBadge::for_status(submission.status),
            created: format_date(&submission.created_at),
        }
    }
}

/// Inbox over one bearer token.
pub struct SubmissionsView<'a> {
    api: &'a ApiClient,
    token: &'a SecretString,
    filter: SubmissionFilter,
    submissions: Vec<Submission>,
}

impl<'a> SubmissionsView<'a> {
    /// Create an empty view with the given filter.
    #[must_use]
    pub const fn new(api: &'a ApiClient, token: &'a SecretString, filter: SubmissionFilter) -> Self {
        Self {
            api,
            token,
            filter,
            submissions: Vec::new(),
        }
    }

    /// Replace the list with the submissions matching the current filter.
    ///
    /// # Errors
    ///
    /// Returns the list call's error; the previous list is kept.
    #[instrument(skip(self), fields(filter = ?self.filter))]
    pub async fn fetch(&mut self) -> Result<&[Submission], ApiError> {
        self.submissions = self.api.list_submissions(self.token, &self.filter).await?;
        tracing::debug!(count = self.submissions.len(), "Fetched submissions");
        Ok(&self.submissions)
    }

    /// Switch to a new filter and fetch.
    ///
    /// # Errors
    ///
    /// Returns the list call's error.
    pub async fn fetch_with(&mut self, filter: SubmissionFilter) -> Result<&[Submission], ApiError> {
        self.filter = filter;
        self.fetch().await
    }

    /// Set a submission's status, then refetch.
    ///
    /// The refetch runs even when the update fails. The update error takes
    /// precedence over a refetch error; either way `submissions()` holds the
    /// freshest list obtained.
    ///
    /// # Errors
    ///
    /// Returns the update error, or the refetch error if only that failed.
    #[instrument(skip(self))]
    pub async fn update_status(
        &mut self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<&[Submission], ApiError> {
        let updated = self.api.update_submission(self.token, id, status).await;
        if let Err(e) = &updated {
            tracing::warn!(error = %e, "Status update failed, refreshing list anyway");
        }

        let refreshed = self.fetch().await.map(|_| ());

        match (updated, refreshed) {
            (Err(e), _) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(&self.submissions),
        }
    }

    #[must_use]
    pub const fn filter(&self) -> &SubmissionFilter {
        &self.filter
    }

    #[must_use]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Rows for rendering, in backend order.
    #[must_use]
    pub fn rows(&self) -> Vec<SubmissionRow> {
        self.submissions.iter().map(SubmissionRow::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_badge_mapping_is_total_and_distinct() {
        let badges: Vec<StatusBadge> = SubmissionStatus::ALL
            .into_iter()
            .map(StatusBadge::for_status)
            .collect();

        for (i, a) in badges.iter().enumerate() {
            for b in badges.iter().skip(i + 1) {
                assert_ne!(a.label, b.label);
                assert_ne!(a.class, b.class);
            }
        }
    }

    #[test]
    fn test_unknown_raw_status_uses_new_badge() {
        assert_eq!(
            StatusBadge::for_raw("spam"),
            StatusBadge::for_status(SubmissionStatus::New)
        );
        assert_eq!(
            StatusBadge::for_raw("contacted"),
            StatusBadge::for_status(SubmissionStatus::Contacted)
        );
    }

    #[test]
    fn test_format_date() {
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 15, 30, 0).unwrap();
        assert_eq!(format_date(&at), "Jan 5, 2025, 03:30 PM");

        let at = Utc.with_ymd_and_hms(2024, 11, 21, 9, 5, 0).unwrap();
        assert_eq!(format_date(&at), "Nov 21, 2024, 09:05 AM");
    }

    #[test]
    fn test_row_from_submission() {
        let submission: Submission = serde_json::from_str(
            r#"{
                "id": 3,
                "full_name": "Ada Lovelace",
                "email": "ada@example.com",
                "company": "",
                "message": "Need a website",
                "service_slug": null,
                "status": "weird",
                "created_at": "2025-01-05T15:30:00"
            }"#,
        )
        .unwrap();

        let row = SubmissionRow::from(&submission);
        assert_eq!(row.service, "General Inquiry");
        assert_eq!(row.company, None);
        assert_eq!(row.badge.label, "New");
        assert_eq!(row.created, "Jan 5, 2025, 03:30 PM");
    }
}
