//! Filesystem-based blob storage implementation.
//!
//! Objects live under `{root}/objects/{key}`; their content type and cache
//! policy live in a JSON sidecar at `{root}/meta/{key}.json`, so no key can
//! collide with another key's metadata.

use crate::blob::{cache_control_or_none, content_type_or_default, require_key};
use crate::{BlobHead, BlobStore, DEFAULT_CACHE_CONTROL, StoredBlob};
use bytes::Bytes;
use curator_error::{CuratorResult, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

const OBJECTS_DIR: &str = "objects";
const META_DIR: &str = "meta";

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    content_type: String,
    #[serde(default)]
    cache_control: Option<String>,
}

/// Filesystem blob store.
///
/// # Example Structure
///
/// ```text
/// /var/curator/blobs/
/// ├── objects/
/// │   └── ri/
/// │       ├── h/1.webp
/// │       └── v/1.webp
/// └── meta/
///     └── ri/
///         ├── h/1.webp.json
///         └── v/1.webp.json
/// ```
///
/// Writes go to a temp file in the destination directory and are renamed
/// into place, so readers never observe a partial object.
#[derive(Debug, Clone)]
pub struct FileSystemBlobStore {
    root: PathBuf,
    cache_control: String,
}

impl FileSystemBlobStore {
    /// Create a filesystem store, creating `root` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryCreation` if the directory cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> CuratorResult<Self> {
        let root = root.into();

        for dir in [root.join(OBJECTS_DIR), root.join(META_DIR)] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }

        tracing::info!(path = %root.display(), "Created filesystem blob store");
        Ok(Self {
            root,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        })
    }

    /// Override the default cache policy.
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a relative path, rejecting anything but plain components.
    fn relative(key: &str) -> Result<PathBuf, StorageError> {
        let key = require_key(key)?;
        let path = Path::new(key);
        let plain = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(format!(
                "{} escapes the storage root",
                key
            ))));
        }
        Ok(path.to_path_buf())
    }

    fn object_path(&self, relative: &Path) -> PathBuf {
        self.root.join(OBJECTS_DIR).join(relative)
    }

    fn meta_path(&self, relative: &Path) -> PathBuf {
        let mut name = relative.as_os_str().to_os_string();
        name.push(".json");
        self.root.join(META_DIR).join(name)
    }

    async fn write_atomic(path: &Path, data: Bytes) -> Result<(), StorageError> {
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tokio::fs::create_dir_all(&parent).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;

        // Each call gets its own temp file; dropping it on error unlinks it.
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut temp = tempfile::Builder::new()
                .prefix(".")
                .suffix(".tmp")
                .tempfile_in(&parent)
                .map_err(|e| {
                    StorageError::new(StorageErrorKind::FileWrite(format!(
                        "temp file in {}: {}",
                        parent.display(),
                        e
                    )))
                })?;

            temp.write_all(&data).map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    temp.path().display(),
                    e
                )))
            })?;

            temp.persist(&target).map(|_| ()).map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "rename {} to {}: {}",
                    e.file.path().display(),
                    target.display(),
                    e.error
                )))
            })
        })
        .await
        .map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "write task for {}: {}",
                path.display(),
                e
            )))
        })?
    }

    async fn read_sidecar(&self, relative: &Path) -> Result<Option<Sidecar>, StorageError> {
        let path = self.meta_path(relative);
        match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).map(Some).map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))),
        }
    }

    async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))),
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for FileSystemBlobStore {
    fn backend(&self) -> &'static str {
        "filesystem"
    }

    fn cache_control(&self) -> &str {
        &self.cache_control
    }

    #[tracing::instrument(skip(self, data, cache_control), fields(size = data.len()))]
    async fn put_with_cache_control(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cache_control: &str,
    ) -> CuratorResult<()> {
        let relative = Self::relative(key)?;
        let sidecar = Sidecar {
            content_type: content_type_or_default(content_type).to_string(),
            cache_control: cache_control_or_none(cache_control),
        };
        let sidecar_json = serde_json::to_vec(&sidecar).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("sidecar for {}: {}", key, e)))
        })?;

        // Sidecar first: a crash between the two writes leaves metadata
        // without an object, which reads treat as missing.
        Self::write_atomic(&self.meta_path(&relative), Bytes::from(sidecar_json)).await?;
        Self::write_atomic(&self.object_path(&relative), data.clone()).await?;

        tracing::info!(
            key,
            path = %self.object_path(&relative).display(),
            size = data.len(),
            "Stored blob"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> CuratorResult<StoredBlob> {
        let relative = Self::relative(key)?;
        let path = self.object_path(&relative);

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(key.trim().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;
        let sidecar = self.read_sidecar(&relative).await?;

        tracing::debug!(key, size = data.len(), "Retrieved blob");
        Ok(StoredBlob {
            data: Bytes::from(data),
            content_type: sidecar
                .as_ref()
                .map(|s| s.content_type.clone())
                .unwrap_or_else(|| crate::DEFAULT_CONTENT_TYPE.to_string()),
            cache_control: sidecar.and_then(|s| s.cache_control),
        })
    }

    async fn head(&self, key: &str) -> CuratorResult<Option<BlobHead>> {
        let relative = Self::relative(key)?;
        let path = self.object_path(&relative);

        let size = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };
        let sidecar = self.read_sidecar(&relative).await?;

        Ok(Some(BlobHead {
            size,
            content_type: sidecar
                .as_ref()
                .map(|s| s.content_type.clone())
                .unwrap_or_else(|| crate::DEFAULT_CONTENT_TYPE.to_string()),
            cache_control: sidecar.and_then(|s| s.cache_control),
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> CuratorResult<()> {
        if key.trim().is_empty() {
            return Ok(());
        }
        let relative = Self::relative(key)?;

        Self::remove_if_present(&self.object_path(&relative)).await?;
        Self::remove_if_present(&self.meta_path(&relative)).await?;

        tracing::info!(key, "Deleted blob");
        Ok(())
    }
}
