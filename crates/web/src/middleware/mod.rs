//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, in-memory store)
//! 4. `clear_on_unauthorized` (central 401 reaction)
//!
//! Route protection is done per handler with the [`RequireAdmin`] extractor.

pub mod auth;
pub mod session;
pub mod unauthorized;

pub use auth::{AuthRejection, CurrentSession, GuardDecision, RequireAdmin, guard};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use unauthorized::clear_on_unauthorized;
