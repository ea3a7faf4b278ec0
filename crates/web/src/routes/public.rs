//! Public site route handlers.
//!
//! Pages degrade gracefully when the backend is down: the service list falls
//! back to the built-in catalogue, blog and course pages show a notice.

use agency_core::{Inquiry, KNOWN_SERVICES, ServiceInfo, ServiceSlug};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::api::{ApiError, CourseSummary, PostSummary, ServiceListing};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

const SUBMIT_SUCCESS_MESSAGE: &str =
    "Thank you! Your request has been submitted. We will get back to you shortly.";
const SUBMIT_MISSING_FIELDS_MESSAGE: &str = "Please fill in your name, email and message.";
const CONTENT_UNAVAILABLE_MESSAGE: &str =
    "Content is temporarily unavailable. Please check back soon.";

// =============================================================================
// View Types
// =============================================================================

/// A service card.
#[derive(Debug, Clone)]
pub struct ServiceCard {
    pub slug: String,
    pub name: String,
    pub summary: String,
}

impl From<&ServiceInfo> for ServiceCard {
    fn from(info: &ServiceInfo) -> Self {
        Self {
            slug: info.slug.to_string(),
            name: info.name.to_string(),
            summary: info.summary.to_string(),
        }
    }
}

impl From<ServiceListing> for ServiceCard {
    fn from(listing: ServiceListing) -> Self {
        let summary = listing
            .description
            .or_else(|| ServiceInfo::find(&listing.slug).map(|info| info.summary.to_string()))
            .unwrap_or_default();
        Self {
            slug: listing.slug,
            name: listing.name,
            summary,
        }
    }
}

fn catalogue() -> Vec<ServiceCard> {
    KNOWN_SERVICES.iter().map(ServiceCard::from).collect()
}

/// Inquiry form data.
#[derive(Debug, Default, Deserialize)]
pub struct InquiryForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl InquiryForm {
    /// Convert to the API body; `None` if a required field is blank.
    fn to_inquiry(&self) -> Option<Inquiry> {
        let required = [&self.full_name, &self.email, &self.message];
        if required.iter().any(|field| field.trim().is_empty()) {
            return None;
        }
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Some(Inquiry {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: optional(&self.company),
            phone: optional(&self.phone),
            message: self.message.trim().to_string(),
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "public/home.html")]
pub struct HomeTemplate {
    pub current_path: String,
    pub services: Vec<ServiceCard>,
}

/// Service list template.
#[derive(Template, WebTemplate)]
#[template(path = "public/services.html")]
pub struct ServicesTemplate {
    pub current_path: String,
    pub services: Vec<ServiceCard>,
    pub offline: bool,
}

/// Service detail template with the inquiry form.
#[derive(Template, WebTemplate)]
#[template(path = "public/service_detail.html")]
pub struct ServiceDetailTemplate {
    pub current_path: String,
    pub service: ServiceCard,
    pub form: InquiryForm,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Blog list template.
#[derive(Template, WebTemplate)]
#[template(path = "public/blog.html")]
pub struct BlogTemplate {
    pub current_path: String,
    pub posts: Vec<PostSummary>,
    pub notice: Option<String>,
}

/// Course list template.
#[derive(Template, WebTemplate)]
#[template(path = "public/courses.html")]
pub struct CoursesTemplate {
    pub current_path: String,
    pub courses: Vec<CourseSummary>,
    pub notice: Option<String>,
}

/// Simple content page template.
#[derive(Template, WebTemplate)]
#[template(path = "public/placeholder.html")]
pub struct PlaceholderTemplate {
    pub current_path: String,
    pub title: String,
    pub body: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the home page.
pub async fn home() -> HomeTemplate {
    HomeTemplate {
        current_path: "/".to_string(),
        services: catalogue(),
    }
}

/// Display the service list.
#[instrument(skip(state))]
pub async fn services(State(state): State<AppState>) -> ServicesTemplate {
    let (services, offline) = match state.api().services().await {
        Ok(listings) if !listings.is_empty() => {
            (listings.into_iter().map(ServiceCard::from).collect(), false)
        }
        Ok(_) => (catalogue(), false),
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to built-in service catalogue");
            (catalogue(), true)
        }
    };

    ServicesTemplate {
        current_path: "/services".to_string(),
        services,
        offline,
    }
}

/// Resolve a service from the API, falling back to the catalogue.
///
/// Slugs that could never name a service are refused before any call. The
/// service endpoints take no token, so a 401 from them is a backend fault and
/// never touches the visitor's session.
async fn load_service(state: &AppState, slug: &str) -> Result<ServiceCard> {
    if !ServiceSlug::is_well_formed(slug) {
        return Err(AppError::NotFound(format!("service '{slug}'")));
    }
    match state.api().service(slug).await {
        Ok(listing) => Ok(ServiceCard::from(listing)),
        Err(e) => {
            if let Some(info) = ServiceInfo::find(slug) {
                tracing::debug!(error = %e, slug, "Using catalogue entry for service");
                return Ok(ServiceCard::from(info));
            }
            match e {
                ApiError::Http { status: 404, .. } => {
                    Err(AppError::NotFound(format!("service '{slug}'")))
                }
                other => Err(other.without_session().into()),
            }
        }
    }
}

/// Display a service with its inquiry form.
#[instrument(skip(state))]
pub async fn service_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ServiceDetailTemplate> {
    let service = load_service(&state, &slug).await?;

    Ok(ServiceDetailTemplate {
        current_path: "/services".to_string(),
        service,
        form: InquiryForm::default(),
        error: None,
        success: None,
    })
}

/// Handle inquiry form submission.
///
/// Required fields are checked locally; nothing is sent when one is blank.
#[instrument(skip(state, form))]
pub async fn submit_inquiry(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<InquiryForm>,
) -> Result<ServiceDetailTemplate> {
    let service = load_service(&state, &slug).await?;

    let Some(inquiry) = form.to_inquiry() else {
        return Ok(ServiceDetailTemplate {
            current_path: "/services".to_string(),
            service,
            form,
            error: Some(SUBMIT_MISSING_FIELDS_MESSAGE.to_string()),
            success: None,
        });
    };

    match state.api().submit_service(&service.slug, &inquiry).await {
        Ok(()) => {
            tracing::info!(slug = %service.slug, "Inquiry submitted");
            Ok(ServiceDetailTemplate {
                current_path: "/services".to_string(),
                service,
                form: InquiryForm::default(),
                error: None,
                success: Some(SUBMIT_SUCCESS_MESSAGE.to_string()),
            })
        }
        Err(e) => Ok(ServiceDetailTemplate {
            current_path: "/services".to_string(),
            service,
            form,
            error: Some(e.user_message()),
            success: None,
        }),
    }
}

/// Display published blog posts.
#[instrument(skip(state))]
pub async fn blog(State(state): State<AppState>) -> BlogTemplate {
    let (posts, notice) = match state.api().posts().await {
        Ok(posts) => (posts, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load blog posts");
            (Vec::new(), Some(CONTENT_UNAVAILABLE_MESSAGE.to_string()))
        }
    };

    BlogTemplate {
        current_path: "/blog".to_string(),
        posts,
        notice,
    }
}

/// Display published courses.
#[instrument(skip(state))]
pub async fn courses(State(state): State<AppState>) -> CoursesTemplate {
    let (courses, notice) = match state.api().courses().await {
        Ok(courses) => (courses, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load courses");
            (Vec::new(), Some(CONTENT_UNAVAILABLE_MESSAGE.to_string()))
        }
    };

    CoursesTemplate {
        current_path: "/courses".to_string(),
        courses,
        notice,
    }
}

/// Display the contact page.
pub async fn contact() -> PlaceholderTemplate {
    PlaceholderTemplate {
        current_path: "/contact".to_string(),
        title: "Contact".to_string(),
        body: "Pick a service and send us an inquiry from its page. We reply within two business days."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inquiry_requires_name_email_message() {
        let form = InquiryForm {
            full_name: "Ada".to_string(),
            email: " ".to_string(),
            message: "Hello".to_string(),
            ..InquiryForm::default()
        };
        assert!(form.to_inquiry().is_none());
    }

    #[test]
    fn test_inquiry_blank_optionals_are_omitted() {
        let form = InquiryForm {
            full_name: " Ada Lovelace ".to_string(),
            email: "ada@example.com".to_string(),
            company: "  ".to_string(),
            phone: "555-0100".to_string(),
            message: "Need analytics".to_string(),
        };
        let inquiry = form.to_inquiry().unwrap();
        assert_eq!(inquiry.full_name, "Ada Lovelace");
        assert_eq!(inquiry.company, None);
        assert_eq!(inquiry.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_service_card_falls_back_to_catalogue_summary() {
        let card = ServiceCard::from(ServiceListing {
            slug: "web-creation".to_string(),
            name: "Web Creation".to_string(),
            description: None,
        });
        assert!(!card.summary.is_empty());
    }
}
