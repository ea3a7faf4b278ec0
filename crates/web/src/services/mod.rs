//! Page-level logic shared by the web routes and the CLI.
//!
//! # Services
//!
//! - `login` - Login form validation and state machine
//! - `submissions` - Submissions inbox (fetch, status updates, presentation)

pub mod login;
pub mod submissions;

pub use login::{BackendStatus, LoginFlow, LoginForm, LoginState, ValidationError};
pub use submissions::{StatusBadge, SubmissionRow, SubmissionsView, format_date};
