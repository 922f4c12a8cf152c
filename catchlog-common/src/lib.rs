//! # catchlog Common Library
//!
//! Shared code for the catchlog services:
//! - Trip report and catch models
//! - Configuration loading and resolution
//! - Admin API key validation
//! - Common error types

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
