//! In-process asset store
//!
//! Keeps uploaded objects in memory. Used by the test suites, and able to
//! fail uploads for chosen file names to exercise dropped attachments.

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::Mutex;

use super::{AssetError, AssetStore};

/// Object held by [`InMemoryAssetStore`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Asset store backed by a `Vec` in memory
pub struct InMemoryAssetStore {
    base_url: String,
    objects: Mutex<Vec<StoredObject>>,
    failing_suffixes: Vec<String>,
}

impl InMemoryAssetStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(Vec::new()),
            failing_suffixes: Vec::new(),
        }
    }

    /// Reject every object whose name ends with one of `suffixes`
    pub fn failing_for<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Objects stored so far, in completion order
    pub async fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().await.clone()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(
        &self,
        object_name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AssetError> {
        if self
            .failing_suffixes
            .iter()
            .any(|suffix| object_name.ends_with(suffix.as_str()))
        {
            return Err(AssetError::Rejected {
                status: 500,
                body: format!("refusing {}", object_name),
            });
        }

        self.objects.lock().await.push(StoredObject {
            name: object_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });

        Ok(format!("{}/{}", self.base_url, object_name))
    }
}
