//! In-memory blob store.

use crate::blob::{cache_control_or_none, content_type_or_default, require_key};
use crate::{BlobHead, BlobStore, DEFAULT_CACHE_CONTROL, StoredBlob};
use bytes::Bytes;
use curator_error::{CuratorResult, StorageError, StorageErrorKind};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Blob store backed by a map, for tests and dry runs.
#[derive(Debug)]
pub struct MemoryBlobStore {
    objects: RwLock<BTreeMap<String, StoredBlob>>,
    cache_control: String,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        }
    }

    /// Override the default cache policy.
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    /// Stored keys in lexical order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn cache_control(&self) -> &str {
        &self.cache_control
    }

    async fn put_with_cache_control(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cache_control: &str,
    ) -> CuratorResult<()> {
        let key = require_key(key)?;
        let blob = StoredBlob {
            data,
            content_type: content_type_or_default(content_type).to_string(),
            cache_control: cache_control_or_none(cache_control),
        };
        self.objects.write().await.insert(key.to_string(), blob);
        tracing::debug!(key, "Stored blob in memory");
        Ok(())
    }

    async fn get(&self, key: &str) -> CuratorResult<StoredBlob> {
        let key = require_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(key.to_string())).into())
    }

    async fn head(&self, key: &str) -> CuratorResult<Option<BlobHead>> {
        let key = require_key(key)?;
        Ok(self.objects.read().await.get(key).map(|blob| BlobHead {
            size: blob.data.len() as u64,
            content_type: blob.content_type.clone(),
            cache_control: blob.cache_control.clone(),
        }))
    }

    async fn delete(&self, key: &str) -> CuratorResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(());
        }
        self.objects.write().await.remove(key);
        Ok(())
    }
}
