//! API module for shared HTTP API functionality
//!
//! Contains only pure functions and shared types; the axum middleware that
//! applies them lives in the service crate.

pub mod auth;

pub use auth::{validate_admin_key, AdminAuthError, ADMIN_KEY_HEADER};
