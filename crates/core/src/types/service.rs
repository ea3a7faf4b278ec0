//! Service slugs and the catalogue of services the agency offers.

use serde::{Deserialize, Serialize};

/// String key identifying a service (e.g. `web-creation`).
///
/// Submissions reference services by slug only; no referential integrity is
/// enforced on this side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceSlug(String);

impl ServiceSlug {
    /// Create a slug from any string.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Borrow the slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `slug` has slug shape: non-empty lowercase ASCII letters,
    /// digits and hyphens.
    #[must_use]
    pub fn is_well_formed(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    }

    /// Display name from the catalogue, or the slug itself when unknown.
    #[must_use]
    pub fn display_name(&self) -> &str {
        ServiceInfo::find(&self.0).map_or(self.0.as_str(), |info| info.name)
    }
}

impl std::fmt::Display for ServiceSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceSlug {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A service offered by the agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInfo {
    pub slug: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}

impl ServiceInfo {
    /// Look up a catalogue entry by slug.
    #[must_use]
    pub fn find(slug: &str) -> Option<&'static Self> {
        KNOWN_SERVICES.iter().find(|info| info.slug == slug)
    }
}

/// Services offered by the agency, in display order.
pub const KNOWN_SERVICES: &[ServiceInfo] = &[
    ServiceInfo {
        slug: "data-analysis",
        name: "Data Analysis",
        summary: "Dashboards, reporting and insight from the data you already have.",
    },
    ServiceInfo {
        slug: "digital-marketing",
        name: "Digital Marketing",
        summary: "Campaigns, SEO and social media that bring in qualified leads.",
    },
    ServiceInfo {
        slug: "graphic-design",
        name: "Graphic Design",
        summary: "Brand identity, print and digital assets.",
    },
    ServiceInfo {
        slug: "web-creation",
        name: "Web Creation",
        summary: "Fast, maintainable websites and web applications.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_known_and_unknown() {
        assert_eq!(ServiceSlug::from("web-creation").display_name(), "Web Creation");
        assert_eq!(ServiceSlug::from("consulting").display_name(), "consulting");
    }

    #[test]
    fn test_slug_shape() {
        assert!(KNOWN_SERVICES.iter().all(|s| ServiceSlug::is_well_formed(s.slug)));
        assert!(ServiceSlug::is_well_formed("seo-2024"));
        for bad in ["", "..", "../admin/submissions", "Web", "a b", "a%2Fb", "a_b"] {
            assert!(!ServiceSlug::is_well_formed(bad), "{bad:?}");
        }
    }

    #[test]
    fn test_catalogue_slugs_unique() {
        let mut slugs: Vec<_> = KNOWN_SERVICES.iter().map(|s| s.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), KNOWN_SERVICES.len());
    }
}
