//! Admin endpoints (bearer authentication).

use agency_core::{DashboardStats, Submission, SubmissionFilter, SubmissionId, SubmissionStatus, User};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{
    ApiClient, ApiError, ListResponse, LoginRequest, LoginResponse, StatsResponse, StatusUpdate,
    VerifyResponse,
};

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// POST /admin/login
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Http` when the backend
    /// rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        self.request(Method::POST, "/admin/login", Some(&body), None)
            .await
    }

    /// Resolve the user a token belongs to.
    ///
    /// POST /admin/verify-token
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is no longer valid.
    #[instrument(skip_all)]
    pub async fn verify_token(&self, token: &SecretString) -> Result<User, ApiError> {
        let response: VerifyResponse = self
            .request(Method::POST, "/admin/verify-token", None::<&()>, Some(token))
            .await?;
        Ok(response.user)
    }

    /// Fetch dashboard counters.
    ///
    /// GET /admin/dashboard/stats
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip_all)]
    pub async fn dashboard_stats(&self, token: &SecretString) -> Result<DashboardStats, ApiError> {
        let response: StatsResponse = self
            .request(Method::GET, "/admin/dashboard/stats", None::<&()>, Some(token))
            .await?;
        Ok(response.into())
    }

    /// List submissions matching a filter.
    ///
    /// GET /admin/submissions?status=&service=
    ///
    /// Only the filter fields that are not `all` are sent.
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip(self, token))]
    pub async fn list_submissions(
        &self,
        token: &SecretString,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, ApiError> {
        let response: ListResponse<Submission> = self
            .get_with_query("/admin/submissions", &filter.query_pairs(), Some(token))
            .await?;
        Ok(response.into_vec())
    }

    /// Set the status of one submission.
    ///
    /// PUT /admin/submissions/{id}
    ///
    /// The updated record in the response is ignored; callers refetch.
    ///
    /// # Errors
    ///
    /// Returns any `ApiError` from the call.
    #[instrument(skip(self, token))]
    pub async fn update_submission(
        &self,
        token: &SecretString,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/admin/submissions/{id}");
        self.request_unit(Method::PUT, &path, Some(&StatusUpdate { status }), Some(token))
            .await
    }
}
