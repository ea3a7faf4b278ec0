//! Agency Core - Shared domain types.
//!
//! This crate provides the types shared by every Agency Platform component:
//! - `web` - Public site and admin panel front end
//! - `cli` - Command-line admin client
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. Everything that talks to the agency REST API lives in `agency-web`.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, submission statuses, roles, filters and stats

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
