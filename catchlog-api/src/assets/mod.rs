//! Binary asset store
//!
//! Pictures are pushed to an object store that hands back a publicly
//! resolvable URL. The store is built once at startup and shared through
//! `AppState` as an `Arc<dyn AssetStore>`.

pub mod memory;
pub mod supabase;

pub use memory::InMemoryAssetStore;
pub use supabase::SupabaseAssetStore;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

/// Asset store errors
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Object store accepting a byte buffer and returning its public URL
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Store `bytes` under `object_name` and return the public URL
    async fn put(
        &self,
        object_name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AssetError>;
}

/// Unique object name for an uploaded file: `<unix millis>-<8 hex>-<file name>`
///
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_` so the name can
/// be used as a URL path segment without escaping.
pub fn object_name(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    };

    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &nonce[..8], sanitized)
}
