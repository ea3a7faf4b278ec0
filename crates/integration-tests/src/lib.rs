//! Integration tests for the Agency Platform front end.
//!
//! Tests run against an in-process [`MockBackend`]: an axum router on an
//! ephemeral port that speaks the agency REST API and records every call it
//! receives. [`WebApp`] starts the full web front end pointed at a mock.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p agency-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - Error classification and request shapes
//! - `session_store` - Restore, login, logout, unauthorized handling
//! - `submissions_view` - Filtered fetch and status updates
//! - `login_flow` - Form validation and state transitions
//! - `web_app` - Full router driven by a cookie-enabled HTTP client

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use agency_web::api::{ApiClient, DEFAULT_TIMEOUT};
use agency_web::config::WebConfig;
use agency_web::state::AppState;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Token the mock issues and accepts.
pub const VALID_TOKEN: &str = "T";

/// Credentials the mock accepts.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// Mount point of the REST API on the mock.
const API_PREFIX: &str = "/api/v1";

// =============================================================================
// Recorded Calls
// =============================================================================

/// One request received by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    /// Path below `/api/v1`.
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl RecordedCall {
    /// Decoded query parameters.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                q.split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_owned(), v.to_owned()),
                        None => (pair.to_owned(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the call is `method path`.
    #[must_use]
    pub fn is(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

// =============================================================================
// Mock Backend
// =============================================================================

#[derive(Debug)]
struct MockData {
    calls: Vec<RecordedCall>,
    submissions: Vec<Value>,
    token_revoked: bool,
    failures: HashMap<(String, String), u16>,
    next_id: i64,
}

#[derive(Clone)]
struct MockState {
    inner: Arc<Mutex<MockData>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check the bearer token; `Err` is the 401 response to send.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let expected = format!("Bearer {VALID_TOKEN}");
        let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if !self.lock().token_revoked && presented == Some(expected.as_str()) {
            return Ok(());
        }
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid or expired token"})),
        )
            .into_response())
    }
}

/// In-process stand-in for the agency REST API.
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
}

impl MockBackend {
    /// Start a mock on an ephemeral port, seeded with three submissions.
    pub async fn start() -> Self {
        let state = MockState {
            inner: Arc::new(Mutex::new(MockData {
                calls: Vec::new(),
                submissions: seed_submissions(),
                token_revoked: false,
                failures: HashMap::new(),
                next_id: 4,
            })),
        };

        let api = Router::new()
            .route("/health", get(health))
            .route("/admin/login", post(login))
            .route("/admin/verify-token", post(verify_token))
            .route("/admin/dashboard/stats", get(dashboard_stats))
            .route("/admin/submissions", get(list_submissions))
            .route("/admin/submissions/{id}", put(update_submission))
            .route("/services", get(services))
            .route("/services/{slug}", get(service))
            .route("/services/{slug}/submit", post(submit_service))
            .route("/posts", get(posts))
            .route("/courses", get(courses));

        let app = Router::new()
            .nest(API_PREFIX, api)
            .layer(from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read mock address");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Self { addr, state }
    }

    /// Base URL of the mock API, e.g. `http://127.0.0.1:40123/api/v1`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// An API client pointed at the mock.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_url(), DEFAULT_TIMEOUT).expect("Failed to build API client")
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Calls received for `method path`.
    #[must_use]
    pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.is(method, path))
            .collect()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Make the backend reject the issued token from now on.
    pub fn revoke_token(&self) {
        self.state.lock().token_revoked = true;
    }

    /// Answer every `method path` call with `status` until cleared.
    pub fn fail(&self, method: &str, path: &str, status: u16) {
        self.state
            .lock()
            .failures
            .insert((method.to_owned(), path.to_owned()), status);
    }

    /// Remove an injected failure.
    pub fn clear_failure(&self, method: &str, path: &str) {
        self.state
            .lock()
            .failures
            .remove(&(method.to_owned(), path.to_owned()));
    }

    /// Current status of a stored submission.
    #[must_use]
    pub fn status_of(&self, id: i64) -> Option<String> {
        self.state
            .lock()
            .submissions
            .iter()
            .find(|s| s["id"] == id)
            .and_then(|s| s["status"].as_str())
            .map(str::to_owned)
    }

    /// Number of stored submissions.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.state.lock().submissions.len()
    }
}

fn seed_submissions() -> Vec<Value> {
    vec![
        json!({
            "id": 3,
            "full_name": "Ann Lee",
            "email": "ann@example.com",
            "company": null,
            "phone": "",
            "message": "General question about pricing",
            "service_slug": null,
            "status": "contacted",
            "created_at": "2024-05-03T16:45:00Z"
        }),
        json!({
            "id": 2,
            "full_name": "John Roe",
            "email": "john@example.com",
            "company": "",
            "phone": "+1 555 0100",
            "message": "Need a new logo",
            "service_slug": "graphic-design",
            "status": "reviewed",
            "created_at": "2024-05-02T09:30:00Z"
        }),
        json!({
            "id": 1,
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "company": "Acme",
            "phone": null,
            "message": "We would like a new website",
            "service_slug": "web-creation",
            "status": "new",
            "created_at": "2024-05-01T10:00:00Z"
        }),
    ]
}

fn admin_user() -> Value {
    json!({"id": 1, "username": ADMIN_USERNAME, "role": "admin"})
}

/// Record the call, then answer with an injected failure or the real route.
async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let path = parts.uri.path();
    let call = RecordedCall {
        method: parts.method.to_string(),
        path: path.strip_prefix(API_PREFIX).unwrap_or(path).to_owned(),
        query: parts.uri.query().map(str::to_owned),
        authorization: parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&bytes).ok(),
    };

    let failure = {
        let mut data = state.lock();
        let failure = data
            .failures
            .get(&(call.method.clone(), call.path.clone()))
            .copied();
        data.calls.push(call);
        failure
    };

    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"error": "Injected failure"}))).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// =============================================================================
// Mock Routes
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.username == ADMIN_USERNAME && body.password == ADMIN_PASSWORD {
        return Json(json!({"token": VALID_TOKEN, "user": admin_user()})).into_response();
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid credentials"})),
    )
        .into_response()
}

async fn verify_token(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    Json(json!({"user": admin_user()})).into_response()
}

async fn dashboard_stats(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let data = state.lock();
    let count = |status: &str| data.submissions.iter().filter(|s| s["status"] == status).count();
    Json(json!({
        "stats": {
            "submissions": {
                "total": data.submissions.len(),
                "new": count("new"),
                "reviewed": count("reviewed")
            },
            "posts": {"total": 3, "published": 2, "drafts": 1},
            "courses": {"total": 1, "published": 1, "drafts": 0}
        }
    }))
    .into_response()
}

async fn list_submissions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let data = state.lock();
    let submissions: Vec<&Value> = data
        .submissions
        .iter()
        .filter(|s| query.get("status").is_none_or(|status| s["status"] == status.as_str()))
        .filter(|s| {
            query
                .get("service")
                .is_none_or(|service| s["service_slug"] == service.as_str())
        })
        .collect();
    Json(json!({"submissions": submissions})).into_response()
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

async fn update_submission(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let mut data = state.lock();
    let Some(submission) = data.submissions.iter_mut().find(|s| s["id"] == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Submission not found"})),
        )
            .into_response();
    };
    submission["status"] = Value::String(body.status);
    Json(json!({"submission": submission.clone()})).into_response()
}

fn catalogue() -> Value {
    json!([
        {"slug": "web-creation", "name": "Web Creation", "description": "Websites that convert."},
        {"slug": "graphic-design", "name": "Graphic Design", "description": "Brands people remember."}
    ])
}

async fn services() -> Json<Value> {
    Json(json!({"services": catalogue()}))
}

async fn service(Path(slug): Path<String>) -> Response {
    let catalogue = catalogue();
    let found = catalogue
        .as_array()
        .and_then(|services| services.iter().find(|s| s["slug"] == slug.as_str()))
        .cloned();
    match found {
        Some(service) => Json(service).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Service not found"})),
        )
            .into_response(),
    }
}

async fn submit_service(
    State(state): State<MockState>,
    Path(slug): Path<String>,
    Json(mut inquiry): Json<Value>,
) -> Response {
    let mut data = state.lock();
    let id = data.next_id;
    data.next_id += 1;

    inquiry["id"] = json!(id);
    inquiry["service_slug"] = json!(slug);
    inquiry["status"] = json!("new");
    inquiry["created_at"] = json!("2024-06-01T09:00:00Z");
    data.submissions.insert(0, inquiry);

    (
        StatusCode::CREATED,
        Json(json!({"message": "Thank you! We will be in touch."})),
    )
        .into_response()
}

async fn posts() -> Json<Value> {
    Json(json!([
        {"title": "Launching our new site", "slug": "launch", "excerpt": "A look behind the scenes."}
    ]))
}

async fn courses() -> Json<Value> {
    Json(json!({"courses": [
        {"title": "SEO Basics", "slug": "seo-basics", "description": "Four weeks of fundamentals."}
    ]}))
}

// =============================================================================
// Web Front End
// =============================================================================

/// The full web front end, served on an ephemeral port.
pub struct WebApp {
    addr: SocketAddr,
}

impl WebApp {
    /// Start the front end against `backend` with default settings.
    pub async fn start(backend: &MockBackend) -> Self {
        Self::start_with(backend, &[]).await
    }

    /// Start the front end with extra configuration variables.
    pub async fn start_with(backend: &MockBackend, vars: &[(&str, &str)]) -> Self {
        let api_url = backend.api_url();
        let config = WebConfig::from_vars(|key| {
            if key == "AGENCY_API_URL" {
                return Some(api_url.clone());
            }
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        })
        .expect("Failed to build web config");

        let state = AppState::new(config).expect("Failed to create application state");
        let app = agency_web::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind web front end");
        let addr = listener.local_addr().expect("Failed to read web address");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Web front end stopped");
            }
        });

        Self { addr }
    }

    /// Absolute URL for a path on the front end.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    #[must_use]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}
