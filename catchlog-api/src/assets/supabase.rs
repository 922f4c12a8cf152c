//! Supabase Storage client
//!
//! Uploads go to `POST {url}/storage/v1/object/{bucket}/{name}`; the bucket is
//! expected to be public, so the returned URL is
//! `{url}/storage/v1/object/public/{bucket}/{name}`.

use async_trait::async_trait;
use axum::body::Bytes;
use catchlog_common::config::StorageConfig;
use std::time::Duration;
use tracing::debug;

use super::{AssetError, AssetStore};

const USER_AGENT: &str = concat!("catchlog/", env!("CARGO_PKG_VERSION"));
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Supabase Storage asset store
pub struct SupabaseAssetStore {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseAssetStore {
    pub fn new(config: &StorageConfig) -> Result<Self, AssetError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| AssetError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    /// Upload endpoint for an object
    pub fn upload_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }

    /// Public URL of an object
    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }
}

#[async_trait]
impl AssetStore for SupabaseAssetStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn put(
        &self,
        object_name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AssetError> {
        let size = bytes.len();

        let response = self
            .http_client
            .post(self.upload_url(object_name))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(object = object_name, size, "Uploaded object to Supabase Storage");
        Ok(self.public_url(object_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SupabaseAssetStore {
        SupabaseAssetStore::new(&StorageConfig {
            url: "https://abc.supabase.co/".to_string(),
            key: "service-key".to_string(),
            bucket: "trips".to_string(),
        })
        .expect("client should build")
    }

    #[test]
    fn test_upload_url() {
        assert_eq!(
            store().upload_url("1700000000000-deadbeef-fish.jpg"),
            "https://abc.supabase.co/storage/v1/object/trips/1700000000000-deadbeef-fish.jpg"
        );
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            store().public_url("1700000000000-deadbeef-fish.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/trips/1700000000000-deadbeef-fish.jpg"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let store = SupabaseAssetStore::new(&StorageConfig {
            url: "http://127.0.0.1:1".to_string(),
            key: "k".to_string(),
            bucket: "b".to_string(),
        })
        .unwrap();

        let result = store
            .put("x.jpg", Bytes::from_static(b"\xff\xd8"), "image/jpeg")
            .await;
        assert!(matches!(result, Err(AssetError::Network(_))));
    }
}
