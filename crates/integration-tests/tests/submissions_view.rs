//! Integration tests for the submissions inbox view.
//!
//! Run with: cargo test -p agency-integration-tests --test submissions_view

use agency_core::{
    ServiceFilter, ServiceSlug, StatusFilter, SubmissionFilter, SubmissionId, SubmissionStatus,
};
use agency_integration_tests::{MockBackend, VALID_TOKEN};
use agency_web::api::ApiError;
use agency_web::services::SubmissionsView;
use secrecy::SecretString;

fn new_only() -> SubmissionFilter {
    SubmissionFilter {
        status: StatusFilter::Only(SubmissionStatus::New),
        service: ServiceFilter::All,
    }
}

#[tokio::test]
async fn test_fetch_all_keeps_backend_order() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let token = SecretString::from(VALID_TOKEN);
    let mut view = SubmissionsView::new(&api, &token, SubmissionFilter::default());

    let ids: Vec<i64> = view
        .fetch()
        .await
        .expect("fetch")
        .iter()
        .map(|s| s.id.as_i64())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let rows = view.rows();
    assert_eq!(rows[0].service, "General Inquiry");
    assert_eq!(rows[0].company, None);
    assert_eq!(rows[1].company, None);
    assert_eq!(rows[2].company.as_deref(), Some("Acme"));
    assert_eq!(rows[2].badge.label, "New");
}

#[tokio::test]
async fn test_fetch_with_switches_filter() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let token = SecretString::from(VALID_TOKEN);
    let mut view = SubmissionsView::new(&api, &token, SubmissionFilter::default());

    let filter = SubmissionFilter {
        status: StatusFilter::All,
        service: ServiceFilter::Only(ServiceSlug::new("graphic-design")),
    };
    let listed = view.fetch_with(filter.clone()).await.expect("fetch");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].full_name, "John Roe");
    assert_eq!(view.filter(), &filter);

    let calls = backend.calls_to("GET", "/admin/submissions");
    assert_eq!(
        calls[0].query_pairs(),
        vec![("service".to_string(), "graphic-design".to_string())]
    );
}

#[tokio::test]
async fn test_update_status_updates_then_refetches_with_current_filter() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let token = SecretString::from(VALID_TOKEN);
    let mut view = SubmissionsView::new(&api, &token, new_only());
    view.fetch().await.expect("fetch");
    backend.clear_calls();

    let listed = view
        .update_status(SubmissionId::new(1), SubmissionStatus::Reviewed)
        .await
        .expect("update");

    // Jane Doe is no longer "new"
    assert!(listed.is_empty());
    assert_eq!(backend.status_of(1).as_deref(), Some("reviewed"));

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].is("PUT", "/admin/submissions/1"));
    assert_eq!(calls[0].body, Some(serde_json::json!({"status": "reviewed"})));
    assert!(calls[1].is("GET", "/admin/submissions"));
    assert_eq!(
        calls[1].query_pairs(),
        vec![("status".to_string(), "new".to_string())]
    );
}

#[tokio::test]
async fn test_failed_update_still_refetches() {
    let backend = MockBackend::start().await;
    backend.fail("PUT", "/admin/submissions/2", 500);
    let api = backend.client();
    let token = SecretString::from(VALID_TOKEN);
    let mut view = SubmissionsView::new(&api, &token, SubmissionFilter::default());

    let err = view
        .update_status(SubmissionId::new(2), SubmissionStatus::Archived)
        .await
        .expect_err("update should fail");

    assert!(matches!(err, ApiError::Http { status: 500, .. }));
    assert_eq!(backend.calls_to("PUT", "/admin/submissions/2").len(), 1);
    assert_eq!(backend.calls_to("GET", "/admin/submissions").len(), 1);
    assert_eq!(view.submissions().len(), 3);
    assert_eq!(backend.status_of(2).as_deref(), Some("reviewed"));
}

#[tokio::test]
async fn test_fetch_reports_unauthorized() {
    let backend = MockBackend::start().await;
    backend.revoke_token();
    let api = backend.client();
    let token = SecretString::from(VALID_TOKEN);
    let mut view = SubmissionsView::new(&api, &token, SubmissionFilter::default());

    let err = view.fetch().await.expect_err("fetch should fail");
    assert!(err.is_unauthorized());
    assert!(view.submissions().is_empty());
}
