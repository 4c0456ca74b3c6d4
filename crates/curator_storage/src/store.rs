//! Blob store trait definition.

use crate::{BlobHead, StoredBlob};
use bytes::Bytes;
use curator_error::CuratorResult;

/// Trait for pluggable blob storage backends.
///
/// Keys are opaque slash-separated strings such as `ri/h/12.webp`.
/// Implementations must treat deleting a missing key as success.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name used in logs (e.g. "s3", "filesystem").
    fn backend(&self) -> &'static str;

    /// Cache-Control applied by [`put`](Self::put).
    fn cache_control(&self) -> &str;

    /// Store `data` under `key` with the backend's default cache policy.
    ///
    /// A blank `content_type` is stored as `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for a blank key, or a backend error.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> CuratorResult<()> {
        let cache_control = self.cache_control().to_string();
        self.put_with_cache_control(key, data, content_type, &cache_control)
            .await
    }

    /// Store `data` under `key` with an explicit cache policy.
    async fn put_with_cache_control(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cache_control: &str,
    ) -> CuratorResult<()>;

    /// Read an object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no object exists under `key`.
    async fn get(&self, key: &str) -> CuratorResult<StoredBlob>;

    /// Read object attributes, or `None` when missing.
    async fn head(&self, key: &str) -> CuratorResult<Option<BlobHead>>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> CuratorResult<bool> {
        Ok(self.head(key).await?.is_some())
    }

    /// Delete an object. Missing objects and blank keys are not errors.
    async fn delete(&self, key: &str) -> CuratorResult<()>;
}
