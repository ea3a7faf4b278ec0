//! Submissions (lead/contact records) and the inbox filter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::SubmissionId;
use super::service::ServiceSlug;
use super::status::{InvalidStatus, SubmissionStatus};

/// A lead/contact record created by a public visitor.
///
/// Owned by the backend; this side only caches the current filtered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub service_slug: Option<ServiceSlug>,
    #[serde(default, deserialize_with = "SubmissionStatus::deserialize_lossy")]
    pub status: SubmissionStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Company name, if one was given.
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Service display name, or "General Inquiry" when none was selected.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.service_slug
            .as_ref()
            .filter(|slug| !slug.as_str().is_empty())
            .map_or("General Inquiry", ServiceSlug::display_name)
    }
}

/// Accept RFC 3339 timestamps as well as naive ISO-8601 ones (assumed UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Status half of the inbox filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(SubmissionStatus),
}

impl StatusFilter {
    /// Value used in forms and query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

/// Service half of the inbox filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceFilter {
    #[default]
    All,
    Only(ServiceSlug),
}

impl ServiceFilter {
    /// Value used in forms and query strings.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(slug) => slug.as_str(),
        }
    }

    /// Parse a raw form value; empty and `all` mean no filtering.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => Self::All,
            slug => Self::Only(ServiceSlug::new(slug)),
        }
    }
}

/// Inbox filter. Transient and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionFilter {
    pub status: StatusFilter,
    pub service: ServiceFilter,
}

impl SubmissionFilter {
    /// Query parameters for the list call: only the fields that are not `all`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let StatusFilter::Only(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if let ServiceFilter::Only(slug) = &self.service {
            pairs.push(("service", slug.as_str().to_owned()));
        }
        pairs
    }

    /// Whether any field narrows the list.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.status != StatusFilter::All || self.service != ServiceFilter::All
    }
}

/// Inquiry posted by a public visitor from a service page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(status: &str) -> String {
        format!(
            r#"{{
                "id": 3,
                "full_name": "Ada Lovelace",
                "email": "ada@example.com",
                "company": "",
                "phone": null,
                "message": "Need a dashboard",
                "service_slug": "data-analysis",
                "status": "{status}",
                "created_at": "2025-03-01T14:30:00"
            }}"#
        )
    }

    #[test]
    fn test_submission_decodes_naive_timestamp() {
        let submission: Submission = serde_json::from_str(&sample_json("reviewed")).unwrap();
        assert_eq!(submission.id, SubmissionId::new(3));
        assert_eq!(submission.status, SubmissionStatus::Reviewed);
        assert_eq!(submission.created_at.to_rfc3339(), "2025-03-01T14:30:00+00:00");
        assert_eq!(submission.company(), None);
        assert_eq!(submission.service_name(), "Data Analysis");
    }

    #[test]
    fn test_submission_unknown_status_is_new() {
        let submission: Submission = serde_json::from_str(&sample_json("escalated")).unwrap();
        assert_eq!(submission.status, SubmissionStatus::New);
    }

    #[test]
    fn test_submission_without_service_is_general() {
        let json = sample_json("new").replace("\"data-analysis\"", "null");
        let submission: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(submission.service_name(), "General Inquiry");
    }

    #[test]
    fn test_filter_query_pairs_cover_all_combinations() {
        let statuses = std::iter::once(StatusFilter::All)
            .chain(SubmissionStatus::ALL.into_iter().map(StatusFilter::Only));
        for status in statuses {
            for service in [ServiceFilter::All, ServiceFilter::parse("graphic-design")] {
                let filter = SubmissionFilter {
                    status,
                    service: service.clone(),
                };
                let pairs = filter.query_pairs();

                let expected_status = match status {
                    StatusFilter::All => None,
                    StatusFilter::Only(s) => Some(s.as_str().to_string()),
                };
                let expected_service = match &service {
                    ServiceFilter::All => None,
                    ServiceFilter::Only(slug) => Some(slug.as_str().to_string()),
                };

                let status_value = pairs.iter().find(|(k, _)| *k == "status").map(|(_, v)| v.clone());
                let service_value = pairs.iter().find(|(k, _)| *k == "service").map(|(_, v)| v.clone());
                assert_eq!(status_value, expected_status);
                assert_eq!(service_value, expected_service);
                assert_eq!(
                    pairs.len(),
                    usize::from(expected_status.is_some()) + usize::from(expected_service.is_some())
                );
            }
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "archived".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(SubmissionStatus::Archived))
        );
        assert!("bogus".parse::<StatusFilter>().is_err());
        assert_eq!(ServiceFilter::parse(" all "), ServiceFilter::All);
        assert!(!SubmissionFilter::default().is_filtered());
    }

    #[test]
    fn test_inquiry_skips_empty_optionals() {
        let inquiry = Inquiry {
            full_name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            company: None,
            phone: None,
            message: "Hello".to_string(),
        };
        let json = serde_json::to_value(&inquiry).unwrap();
        assert!(json.get("company").is_none());
        assert_eq!(json["message"], "Hello");
    }
}
