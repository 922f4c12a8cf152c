//! Admin API key validation
//!
//! Administrative endpoints are guarded by a single shared secret sent in the
//! `x-admin-api-key` header. Keys are compared in constant time over their
//! SHA-256 digests.

use sha2::{Digest, Sha256};

/// Header carrying the admin API key
pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";

/// Admin key validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuthError {
    /// Header absent from the request
    MissingKey,
    /// Header present but does not match the configured key
    InvalidKey,
}

impl std::fmt::Display for AdminAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminAuthError::MissingKey => write!(f, "Missing admin API key"),
            AdminAuthError::InvalidKey => write!(f, "Invalid admin API key"),
        }
    }
}

impl std::error::Error for AdminAuthError {}

/// Validate the provided admin key against the configured one
pub fn validate_admin_key(provided: Option<&str>, expected: &str) -> Result<(), AdminAuthError> {
    let provided = provided.ok_or(AdminAuthError::MissingKey)?;

    let provided_digest = Sha256::digest(provided.as_bytes());
    let expected_digest = Sha256::digest(expected.as_bytes());

    let diff = provided_digest
        .iter()
        .zip(expected_digest.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    if diff == 0 {
        Ok(())
    } else {
        Err(AdminAuthError::InvalidKey)
    }
}
