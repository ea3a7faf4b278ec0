//! Integration tests for the session store lifecycle.
//!
//! Run with: cargo test -p agency-integration-tests --test session_store

use agency_core::{Role, User, UserId};
use agency_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, MockBackend, VALID_TOKEN};
use agency_web::session::{
    LoginOutcome, MemoryStorage, SESSION_EXPIRED_MESSAGE, SessionStore, TokenStorage,
};
use secrecy::{ExposeSecret, SecretString};

fn stored_admin() -> User {
    User {
        id: UserId::new(1),
        username: ADMIN_USERNAME.to_string(),
        role: Role::Admin,
    }
}

// ============================================================================
// Initialize
// ============================================================================

#[tokio::test]
async fn test_initialize_without_token_makes_no_calls() {
    let backend = MockBackend::start().await;
    let mut store = SessionStore::new(backend.client(), MemoryStorage::default());

    assert!(store.state().loading);
    store.initialize().await.expect("initialize");

    assert!(!store.state().loading);
    assert!(store.user().is_none());
    assert!(store.state().error.is_none());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_initialize_restores_valid_token() {
    let backend = MockBackend::start().await;
    let storage = MemoryStorage::with_token(VALID_TOKEN, None);
    let mut store = SessionStore::new(backend.client(), storage.clone());

    store.initialize().await.expect("initialize");

    assert!(!store.state().loading);
    assert_eq!(store.user(), Some(&stored_admin()));
    assert_eq!(
        store.token().map(|t| t.expose_secret().to_string()),
        Some(VALID_TOKEN.to_string())
    );
    assert!(store.is_admin());
    assert!(store.is_editor());

    let calls = backend.calls_to("POST", "/admin/verify-token");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer T"));

    // The verified user is written back
    assert_eq!(storage.load_user().await.expect("load"), Some(stored_admin()));
}

#[tokio::test]
async fn test_initialize_with_revoked_token_clears_storage() {
    let backend = MockBackend::start().await;
    backend.revoke_token();
    let storage = MemoryStorage::with_token(VALID_TOKEN, Some(stored_admin()));
    let mut store = SessionStore::new(backend.client(), storage.clone());

    store.initialize().await.expect("initialize");

    assert!(!store.state().loading);
    assert!(store.user().is_none());
    assert!(store.token().is_none());
    assert_eq!(store.state().error.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
    assert_eq!(storage.load_token().await.expect("load"), None);
    assert_eq!(storage.load_user().await.expect("load"), None);
}

#[tokio::test]
async fn test_initialize_runs_once() {
    let backend = MockBackend::start().await;
    let storage = MemoryStorage::with_token(VALID_TOKEN, None);
    let mut store = SessionStore::new(backend.client(), storage);

    store.initialize().await.expect("first initialize");
    store.initialize().await.expect("second initialize");

    assert_eq!(backend.calls_to("POST", "/admin/verify-token").len(), 1);
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_success_persists_credentials() {
    let backend = MockBackend::start().await;
    let storage = MemoryStorage::default();
    let mut store = SessionStore::new(backend.client(), storage.clone());

    let outcome = store
        .login(ADMIN_USERNAME, &SecretString::from(ADMIN_PASSWORD))
        .await
        .expect("login");

    assert_eq!(outcome, LoginOutcome::Success(stored_admin()));
    assert_eq!(store.user(), Some(&stored_admin()));
    assert!(store.state().error.is_none());
    assert_eq!(
        storage.load_token().await.expect("load").as_deref(),
        Some(VALID_TOKEN)
    );
    assert_eq!(storage.load_user().await.expect("load"), Some(stored_admin()));
}

#[tokio::test]
async fn test_login_failure_leaves_storage_untouched() {
    let backend = MockBackend::start().await;
    let storage = MemoryStorage::with_token("previous", Some(stored_admin()));
    let mut store = SessionStore::new(backend.client(), storage.clone());

    let outcome = store
        .login(ADMIN_USERNAME, &SecretString::from("wrong"))
        .await
        .expect("login");

    assert_eq!(
        outcome,
        LoginOutcome::Failure("Invalid credentials".to_string())
    );
    assert_eq!(store.state().error.as_deref(), Some("Invalid credentials"));
    assert_eq!(
        storage.load_token().await.expect("load").as_deref(),
        Some("previous")
    );
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let backend = MockBackend::start().await;
    let storage = MemoryStorage::default();
    let mut store = SessionStore::new(backend.client(), storage.clone());
    store
        .login(ADMIN_USERNAME, &SecretString::from(ADMIN_PASSWORD))
        .await
        .expect("login");

    store.logout().await.expect("logout");

    assert!(store.user().is_none());
    assert!(store.token().is_none());
    assert!(!store.is_admin());
    assert_eq!(storage.load_token().await.expect("load"), None);
    assert_eq!(storage.load_user().await.expect("load"), None);
}

#[tokio::test]
async fn test_handle_unauthorized_clears_persisted_state() {
    let backend = MockBackend::start().await;
    let storage = MemoryStorage::with_token(VALID_TOKEN, None);
    let mut store = SessionStore::new(backend.client(), storage.clone());
    store.initialize().await.expect("initialize");
    assert!(store.user().is_some());

    store.handle_unauthorized().await.expect("handle 401");

    assert!(store.user().is_none());
    assert_eq!(storage.load_token().await.expect("load"), None);
}
