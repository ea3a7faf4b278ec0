//! Public endpoints (no authentication).

use agency_core::Inquiry;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, CourseSummary, ListResponse, PostSummary, ServiceListing};

impl ApiClient {
    /// Liveness probe.
    ///
    /// GET /health
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), ApiError> {
        self.request_unit(Method::GET, "/health", None::<&()>, None)
            .await
    }

    /// List the services offered.
    ///
    /// GET /services
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip(self))]
    pub async fn services(&self) -> Result<Vec<ServiceListing>, ApiError> {
        let response: ListResponse<ServiceListing> = self
            .request(Method::GET, "/services", None::<&()>, None)
            .await?;
        Ok(response.into_vec())
    }

    /// Fetch one service.
    ///
    /// GET /services/{slug}
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` with status 404 for unknown slugs.
    #[instrument(skip(self))]
    pub async fn service(&self, slug: &str) -> Result<ServiceListing, ApiError> {
        let path = self.segment_path(&["services", slug])?;
        self.request(Method::GET, &path, None::<&()>, None).await
    }

    /// Submit an inquiry for a service.
    ///
    /// POST /services/{slug}/submit
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip(self, inquiry), fields(email = %inquiry.email))]
    pub async fn submit_service(&self, slug: &str, inquiry: &Inquiry) -> Result<(), ApiError> {
        let path = self.segment_path(&["services", slug, "submit"])?;
        self.request_unit(Method::POST, &path, Some(inquiry), None)
            .await
    }

    /// List published blog posts.
    ///
    /// GET /posts
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip(self))]
    pub async fn posts(&self) -> Result<Vec<PostSummary>, ApiError> {
        let response: ListResponse<PostSummary> = self
            .request(Method::GET, "/posts", None::<&()>, None)
            .await?;
        Ok(response.into_vec())
    }

    /// List published courses.
    ///
    /// GET /courses
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip(self))]
    pub async fn courses(&self) -> Result<Vec<CourseSummary>, ApiError> {
        let response: ListResponse<CourseSummary> = self
            .request(Method::GET, "/courses", None::<&()>, None)
            .await?;
        Ok(response.into_vec())
    }
}
