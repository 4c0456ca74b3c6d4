//! Blob store configuration and backend selection.

use crate::{BlobStore, DEFAULT_CACHE_CONTROL, FileSystemBlobStore, MemoryBlobStore, S3BlobStore};
use curator_error::{CuratorResult, StorageError, StorageErrorKind};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Which blob backend to use.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum BlobBackend {
    /// Local directory tree
    #[default]
    #[display("filesystem")]
    Filesystem,
    /// S3-compatible object storage
    #[display("s3")]
    S3,
    /// Process memory, lost on exit
    #[display("memory")]
    Memory,
}

/// Blob store configuration.
///
/// # Examples
///
/// ```
/// use curator_storage::{BlobBackend, BlobConfig};
///
/// let config = BlobConfig::default()
///     .with_backend(BlobBackend::S3)
///     .with_bucket("gallery")
///     .with_endpoint("https://example.r2.cloudflarestorage.com");
/// assert_eq!(config.region(), "auto");
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct BlobConfig {
    /// Backend selection
    #[serde(default)]
    backend: BlobBackend,

    /// Root directory for the filesystem backend
    #[serde(default = "default_root")]
    #[setters(into)]
    root: PathBuf,

    /// Bucket for the S3 backend
    #[serde(default)]
    #[setters(strip_option, into)]
    bucket: Option<String>,

    /// Custom S3 endpoint (R2, MinIO)
    #[serde(default)]
    #[setters(strip_option, into)]
    endpoint: Option<String>,

    /// S3 region
    #[serde(default = "default_region")]
    #[setters(into)]
    region: String,

    /// Static access key id
    #[serde(default)]
    #[setters(strip_option, into)]
    access_key_id: Option<String>,

    /// Static secret access key
    #[serde(default)]
    #[setters(strip_option, into)]
    secret_access_key: Option<String>,

    /// Cache-Control for uploaded gallery objects
    #[serde(default = "default_cache_control")]
    #[setters(into)]
    cache_control: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("./gallery-blobs")
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_cache_control() -> String {
    DEFAULT_CACHE_CONTROL.to_string()
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::default(),
            root: default_root(),
            bucket: None,
            endpoint: None,
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            cache_control: default_cache_control(),
        }
    }
}

impl std::fmt::Debug for BlobConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobConfig")
            .field("backend", &self.backend)
            .field("root", &self.root)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("cache_control", &self.cache_control)
            .finish()
    }
}

/// Build the configured blob store.
///
/// # Errors
///
/// Returns `InvalidConfig` when the S3 backend has no bucket, or any error
/// from constructing the backend.
#[tracing::instrument(skip(config), fields(backend = %config.backend))]
pub async fn open_blob_store(config: &BlobConfig) -> CuratorResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        BlobBackend::Filesystem => Arc::new(
            FileSystemBlobStore::new(config.root.clone())?
                .with_cache_control(config.cache_control.clone()),
        ),
        BlobBackend::Memory => {
            tracing::warn!("Using in-memory blob store; objects are lost on exit");
            Arc::new(MemoryBlobStore::new().with_cache_control(config.cache_control.clone()))
        }
        BlobBackend::S3 => {
            let bucket = config.bucket.as_deref().ok_or_else(|| {
                StorageError::new(StorageErrorKind::InvalidConfig(
                    "blob.bucket is required for the s3 backend".to_string(),
                ))
            })?;
            Arc::new(
                S3BlobStore::connect(
                    bucket,
                    config.endpoint.as_deref(),
                    &config.region,
                    config.access_key_id.as_deref(),
                    config.secret_access_key.as_deref(),
                )
                .await?
                .with_cache_control(config.cache_control.clone()),
            )
        }
    };
    Ok(store)
}
