//! Status and role enums.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A status string that does not name a known submission status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid submission status: {0}")]
pub struct InvalidStatus(pub String);

/// Submission workflow status.
///
/// Any status may be set from any other; the backend owns the workflow rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    New,
    Reviewed,
    Contacted,
    Archived,
}

impl SubmissionStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [Self::New, Self::Reviewed, Self::Contacted, Self::Archived];

    /// Wire value sent to and received from the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reviewed => "reviewed",
            Self::Contacted => "contacted",
            Self::Archived => "archived",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Reviewed => "Reviewed",
            Self::Contacted => "Contacted",
            Self::Archived => "Archived",
        }
    }

    /// Label for the "move to this status" action.
    #[must_use]
    pub const fn action_label(self) -> &'static str {
        match self {
            Self::New => "Mark as New",
            Self::Reviewed => "Mark as Reviewed",
            Self::Contacted => "Mark as Contacted",
            Self::Archived => "Archive",
        }
    }

    /// Parse a raw status, falling back to `New` for unrecognized values.
    #[must_use]
    pub fn from_raw_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Lenient serde adapter for records owned by the backend.
    ///
    /// Unknown values decode as `New` so that presentation stays total.
    ///
    /// # Errors
    ///
    /// Returns an error only if the value is not a string.
    pub fn deserialize_lossy<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().or_else(|_| {
            tracing::warn!(status = %raw, "unrecognized submission status, treating as new");
            Ok(Self::New)
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "reviewed" => Ok(Self::Reviewed),
            "contacted" => Ok(Self::Contacted),
            "archived" => Ok(Self::Archived),
            _ => Err(InvalidStatus(s.to_owned())),
        }
    }
}

/// Coarse permission tag attached to a user.
///
/// Roles other than `admin` and `editor` are kept verbatim so nothing the
/// backend sends is lost on a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Editor,
    Other(String),
}

impl Role {
    /// Wire value of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "editor" => Self::Editor,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "admin".to_owned(),
            Role::Editor => "editor".to_owned(),
            Role::Other(other) => other,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        for status in SubmissionStatus::ALL {
            assert_eq!(status.as_str().parse::<SubmissionStatus>(), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }
        assert_eq!(
            "pending".parse::<SubmissionStatus>(),
            Err(InvalidStatus("pending".to_string()))
        );
    }

    #[test]
    fn test_status_labels_distinct() {
        let labels: std::collections::HashSet<_> =
            SubmissionStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_status_lossy_fallback() {
        assert_eq!(
            SubmissionStatus::from_raw_lossy("contacted"),
            SubmissionStatus::Contacted
        );
        assert_eq!(
            SubmissionStatus::from_raw_lossy("spam"),
            SubmissionStatus::New
        );
    }

    #[test]
    fn test_role_wire_format() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        let role: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, Role::Other("viewer".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"viewer\"");
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"editor\"");
    }
}
