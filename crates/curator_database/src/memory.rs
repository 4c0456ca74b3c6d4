//! In-memory metadata store.

use crate::{MetadataStore, normalize_record};
use curator_core::{GalleryCounts, GalleryImage, ImageStatus, Orientation};
use curator_error::{CuratorResult, DatabaseError, DatabaseErrorKind};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    images: BTreeMap<String, GalleryImage>,
    blocklist: BTreeMap<String, Option<String>>,
}

impl MemoryState {
    fn conflict(&self, image: &GalleryImage) -> Option<&'static str> {
        if self.images.contains_key(&image.id) {
            return Some("gallery_images_pkey");
        }
        self.images.values().find_map(|existing| {
            if existing.source_key == image.source_key {
                Some("gallery_images_source_key_key")
            } else if existing.sha256 == image.sha256 {
                Some("gallery_images_sha256_key")
            } else if existing.blob_key == image.blob_key {
                Some("gallery_images_blob_key_key")
            } else if existing.orientation == image.orientation && existing.seq == image.seq {
                Some("gallery_images_orientation_seq_key")
            } else {
                None
            }
        })
    }
}

/// Metadata store held in process memory.
///
/// Enforces the same uniqueness rules as the Postgres schema, so it doubles
/// as the reference backend for pipeline tests.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    state: RwLock<MemoryState>,
}

impl InMemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record, ordered by id.
    pub async fn images(&self) -> Vec<GalleryImage> {
        self.state.read().await.images.values().cloned().collect()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.read().await.images.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.images.is_empty()
    }

    /// Change the status of a stored record, as moderation would.
    pub async fn set_status(&self, id: &str, status: ImageStatus) -> bool {
        match self.state.write().await.images.get_mut(id.trim()) {
            Some(image) => {
                image.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl MetadataStore for InMemoryMetadataStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn is_blocked(&self, source_key: &str) -> CuratorResult<bool> {
        let key = source_key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        Ok(self.state.read().await.blocklist.contains_key(key))
    }

    async fn exists_by_source_key(&self, source_key: &str) -> CuratorResult<bool> {
        let key = source_key.trim();
        Ok(self
            .state
            .read()
            .await
            .images
            .values()
            .any(|image| image.source_key == key))
    }

    async fn exists_by_fingerprint(&self, sha256: &str) -> CuratorResult<bool> {
        let sha256 = sha256.trim().to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .images
            .values()
            .any(|image| image.sha256 == sha256))
    }

    async fn next_sequence(&self, orientation: Orientation) -> CuratorResult<i64> {
        let max = self
            .state
            .read()
            .await
            .images
            .values()
            .filter(|image| image.orientation == orientation)
            .map(|image| image.seq)
            .max()
            .unwrap_or(0);
        Ok(max.max(0) + 1)
    }

    #[tracing::instrument(skip(self, image), fields(source_key = %image.source_key, seq = image.seq))]
    async fn insert(&self, image: GalleryImage) -> CuratorResult<GalleryImage> {
        let image = normalize_record(image)?;
        let mut state = self.state.write().await;
        if let Some(constraint) = state.conflict(&image) {
            tracing::warn!(constraint, "Rejected duplicate gallery record");
            return Err(DatabaseError::new(DatabaseErrorKind::UniqueViolation(format!(
                "duplicate key value violates unique constraint \"{}\"",
                constraint
            )))
            .into());
        }
        state.images.insert(image.id.clone(), image.clone());
        tracing::debug!(id = %image.id, "Inserted gallery record");
        Ok(image)
    }

    async fn count_active_by_orientation(&self) -> CuratorResult<GalleryCounts> {
        let state = self.state.read().await;
        let mut counts = GalleryCounts::default();
        for image in state
            .images
            .values()
            .filter(|image| image.status == ImageStatus::Active)
        {
            counts.set(image.orientation, counts.get(image.orientation) + 1);
        }
        Ok(counts)
    }

    async fn get_by_source_key(&self, source_key: &str) -> CuratorResult<Option<GalleryImage>> {
        let key = source_key.trim();
        Ok(self
            .state
            .read()
            .await
            .images
            .values()
            .find(|image| image.source_key == key)
            .cloned())
    }

    async fn block_source(&self, source_key: &str, reason: Option<&str>) -> CuratorResult<bool> {
        let key = source_key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self.state
            .write()
            .await
            .blocklist
            .insert(key.to_string(), reason);
        Ok(true)
    }

    async fn unblock_source(&self, source_key: &str) -> CuratorResult<bool> {
        let key = source_key.trim();
        Ok(self.state.write().await.blocklist.remove(key).is_some())
    }
}
