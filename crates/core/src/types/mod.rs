//! Core types for the Agency Platform.
//!
//! This module provides type-safe wrappers for the records exchanged with
//! the agency REST API.

pub mod id;
pub mod service;
pub mod stats;
pub mod status;
pub mod submission;
pub mod user;

pub use id::*;
pub use service::{KNOWN_SERVICES, ServiceInfo, ServiceSlug};
pub use stats::{ContentCounts, DashboardStats, SubmissionCounts};
pub use status::*;
pub use submission::{Inquiry, ServiceFilter, StatusFilter, Submission, SubmissionFilter};
pub use user::User;
