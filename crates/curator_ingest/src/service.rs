//! The gallery ingestion orchestrator.

use crate::IngestConfig;
use curator_core::{
    CANONICAL_MIME, GalleryCounts, GalleryImage, ImageStatus, Orientation, PreparedImage,
    SkipReason, StoreInput, StoreOutcome, blob_key, pick_id,
};
use curator_database::MetadataStore;
use curator_error::{
    CuratorError, CuratorErrorKind, CuratorResult, IngestError, IngestErrorKind,
};
use curator_normalize::ImageProcessor;
use curator_storage::BlobStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

/// Ingests images into the deduplicated, sequentially numbered gallery.
///
/// Each call runs a fixed protocol: blocklist, source dedup, normalize,
/// hash dedup, then under the orientation's lock a second dedup pass,
/// sequence allocation, blob upload and the metadata insert. A failed insert
/// deletes the uploaded blob again.
///
/// The two orientation locks belong to the instance. They make allocation
/// collision-free within one service; separate services sharing the same
/// stores rely on the metadata store's unique constraints instead.
///
/// # Examples
///
/// ```
/// use curator_core::StoreInput;
/// use curator_database::InMemoryMetadataStore;
/// use curator_ingest::GalleryService;
/// use curator_normalize::{LosslessWebpEncoder, WebpNormalizer};
/// use curator_storage::MemoryBlobStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = GalleryService::new(
///     Arc::new(InMemoryMetadataStore::new()),
///     Arc::new(MemoryBlobStore::new()),
///     Arc::new(WebpNormalizer::new(Arc::new(LosslessWebpEncoder::new()))),
/// );
///
/// let raw = std::fs::read("cat.png")?;
/// let outcome = service
///     .store_to_gallery(StoreInput::new("tg:42:1", raw).with_source("telegram"))
///     .await?;
/// println!("{}", outcome.summary("tg"));
/// # Ok(())
/// # }
/// ```
pub struct GalleryService {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    processor: Arc<dyn ImageProcessor>,
    config: IngestConfig,
    horizontal: Arc<Mutex<()>>,
    vertical: Arc<Mutex<()>>,
}

impl std::fmt::Debug for GalleryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryService")
            .field("metadata", &self.metadata.backend())
            .field("blobs", &self.blobs.backend())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GalleryService {
    /// Create a service with default settings.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        processor: Arc<dyn ImageProcessor>,
    ) -> Self {
        Self {
            metadata,
            blobs,
            processor,
            config: IngestConfig::default(),
            horizontal: Arc::new(Mutex::new(())),
            vertical: Arc::new(Mutex::new(())),
        }
    }

    /// Replace the settings.
    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// Current settings.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Metadata store in use.
    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// Blob store in use.
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Normalize raw bytes without touching either store.
    ///
    /// # Errors
    ///
    /// Returns the normalizer's error unchanged.
    pub async fn prepare(&self, raw: &[u8]) -> CuratorResult<PreparedImage> {
        Ok(self.processor.prepare(raw).await?)
    }

    /// Ingest one image.
    ///
    /// # Errors
    ///
    /// See [`store_to_gallery_with_cancel`](Self::store_to_gallery_with_cancel).
    pub async fn store_to_gallery(&self, input: StoreInput) -> CuratorResult<StoreOutcome> {
        self.store_to_gallery_with_cancel(input, &CancellationToken::new())
            .await
    }

    /// Ingest one image, giving up promptly once `cancel` fires.
    ///
    /// Skips are returned as [`StoreOutcome::Skipped`], never as errors.
    /// Cancellation is honored up to the metadata insert; once the insert
    /// has started it runs to completion on a background task, together
    /// with the compensating delete if it fails. Dropping the returned
    /// future behaves the same way.
    ///
    /// # Errors
    ///
    /// - `MissingSourceKey` / `EmptyInput` before any I/O
    /// - the normalizer's error, unchanged
    /// - `Store` for a failed check, allocation or count
    /// - `Upload` when the blob put fails
    /// - `Insert` when the record is rejected after upload
    /// - `Cancelled` naming the step that was interrupted
    #[tracing::instrument(
        skip(self, input, cancel),
        fields(source = %input.source.trim(), source_key = %input.source_key.trim(), size = input.raw.len())
    )]
    pub async fn store_to_gallery_with_cancel(
        &self,
        input: StoreInput,
        cancel: &CancellationToken,
    ) -> CuratorResult<StoreOutcome> {
        let input = input.normalized();
        if input.source_key.is_empty() {
            return Err(IngestError::new(IngestErrorKind::MissingSourceKey).into());
        }
        if input.raw.is_empty() {
            return Err(IngestError::new(IngestErrorKind::EmptyInput).into());
        }
        let source_key = input.source_key.as_str();

        if store_call(cancel, "is_blocked", self.metadata.is_blocked(source_key)).await? {
            tracing::info!("Source is blocked");
            return Ok(skipped(SkipReason::BlockedSource, None));
        }
        if store_call(
            cancel,
            "exists_by_source_key",
            self.metadata.exists_by_source_key(source_key),
        )
        .await?
        {
            tracing::info!("Source already stored");
            return Ok(skipped(SkipReason::DuplicateSource, None));
        }

        let prepared = until_cancelled(cancel, "prepare", async {
            Ok::<_, CuratorError>(self.processor.prepare(&input.raw).await?)
        })
        .await?;
        let fingerprint = prepared.sha256().clone();
        let orientation = *prepared.orientation();
        tracing::debug!(
            sha256 = %fingerprint,
            orientation = %orientation,
            mode = %prepared.mode(),
            "Prepared image"
        );

        if store_call(
            cancel,
            "exists_by_fingerprint",
            self.metadata.exists_by_fingerprint(&fingerprint),
        )
        .await?
        {
            tracing::info!(sha256 = %fingerprint, "Content already stored");
            return Ok(skipped(SkipReason::DuplicateHash, Some(fingerprint)));
        }

        let guard = until_cancelled(cancel, "lock", async {
            Ok::<_, CuratorError>(self.lock_for(orientation).lock_owned().await)
        })
        .await?;

        if store_call(
            cancel,
            "exists_by_source_key",
            self.metadata.exists_by_source_key(source_key),
        )
        .await?
        {
            tracing::info!("Source stored while waiting for the lock");
            return Ok(skipped(SkipReason::DuplicateSourceRace, Some(fingerprint)));
        }
        if store_call(
            cancel,
            "exists_by_fingerprint",
            self.metadata.exists_by_fingerprint(&fingerprint),
        )
        .await?
        {
            tracing::info!(sha256 = %fingerprint, "Content stored while waiting for the lock");
            return Ok(skipped(SkipReason::DuplicateHashRace, Some(fingerprint)));
        }

        let seq = store_call(
            cancel,
            "next_sequence",
            self.metadata.next_sequence(orientation),
        )
        .await?;
        let key = blob_key(self.config.key_prefix(), orientation, seq);

        until_cancelled(cancel, "upload", async {
            self.blobs
                .put(&key, prepared.data().clone(), CANONICAL_MIME)
                .await
                .map_err(|e| {
                    tracing::error!(blob_key = %key, error = %e, "Upload failed");
                    CuratorError::from(IngestError::new(IngestErrorKind::Upload {
                        key: key.clone(),
                        message: e.to_string(),
                    }))
                })
        })
        .await?;

        let image = self.record(&input, &prepared, orientation, seq, key);
        let image = self.commit(image, guard).await?;
        tracing::info!(
            id = %image.id,
            orientation = %image.orientation,
            seq = image.seq,
            blob_key = %image.blob_key,
            "Stored gallery image"
        );

        let counts = self.counts_after_insert(cancel).await;
        Ok(StoreOutcome::Added {
            image,
            counts,
            fingerprint,
        })
    }

    fn lock_for(&self, orientation: Orientation) -> Arc<Mutex<()>> {
        match orientation {
            Orientation::Horizontal => Arc::clone(&self.horizontal),
            Orientation::Vertical => Arc::clone(&self.vertical),
        }
    }

    fn record(
        &self,
        input: &StoreInput,
        prepared: &PreparedImage,
        orientation: Orientation,
        seq: i64,
        key: String,
    ) -> GalleryImage {
        GalleryImage {
            id: pick_id(input.id.as_deref(), &input.source_key, prepared.sha256()),
            source: input.source.clone(),
            source_key: input.source_key.clone(),
            source_url: input.source_url.clone(),
            source_post_id: input.source_post_id.clone(),
            sha256: prepared.sha256().clone(),
            orientation,
            seq,
            blob_key: key,
            width: *prepared.width(),
            height: *prepared.height(),
            bytes: *prepared.bytes(),
            mime_type: CANONICAL_MIME.to_string(),
            published_at: input.published_at,
            collected_at: input
                .collected_at
                .filter(|at| *at > 0)
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
            status: ImageStatus::Active,
        }
    }

    /// Insert the record on a detached task that owns the orientation lock.
    ///
    /// The insert is the commit point. Dropping the caller's future must not
    /// abandon it halfway or skip the compensating delete, so the task is
    /// spawned and runs to completion whether or not anyone awaits it.
    async fn commit(
        &self,
        image: GalleryImage,
        guard: OwnedMutexGuard<()>,
    ) -> CuratorResult<GalleryImage> {
        let metadata = Arc::clone(&self.metadata);
        let blobs = Arc::clone(&self.blobs);
        let timeout = self.config.compensation_timeout();

        let task = tokio::spawn(async move {
            let result = insert_or_compensate(metadata, blobs, image, timeout).await;
            drop(guard);
            result
        });

        task.await
            .map_err(|e| IngestError::new(IngestErrorKind::Commit(e.to_string())))?
    }

    async fn counts_after_insert(&self, cancel: &CancellationToken) -> Option<GalleryCounts> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Cancelled before counts; reporting none");
                None
            }
            result = self.metadata.count_active_by_orientation() => match result {
                Ok(counts) => Some(counts),
                Err(e) => {
                    tracing::warn!(error = %e, "Count query failed after insert");
                    None
                }
            },
        }
    }
}

async fn insert_or_compensate(
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    image: GalleryImage,
    timeout: Duration,
) -> CuratorResult<GalleryImage> {
    let key = image.blob_key.clone();
    match metadata.insert(image).await {
        Ok(image) => Ok(image),
        Err(err) => {
            let conflict = matches!(
                err.kind(),
                CuratorErrorKind::Database(e) if e.is_unique_violation()
            );
            tracing::error!(blob_key = %key, conflict, error = %err, "Insert failed; removing blob");
            compensate(blobs.as_ref(), &key, timeout).await;
            Err(IngestError::new(IngestErrorKind::Insert {
                message: err.to_string(),
                conflict,
            })
            .into())
        }
    }
}

/// Best-effort delete of an uploaded blob whose record was never written.
async fn compensate(blobs: &dyn BlobStore, key: &str, timeout: Duration) {
    match tokio::time::timeout(timeout, blobs.delete(key)).await {
        Ok(Ok(())) => tracing::info!(blob_key = key, "Removed orphaned blob"),
        Ok(Err(e)) => {
            tracing::warn!(blob_key = key, error = %e, "Compensating delete failed; blob orphaned")
        }
        Err(_) => tracing::warn!(
            blob_key = key,
            timeout_secs = timeout.as_secs(),
            "Compensating delete timed out; blob orphaned"
        ),
    }
}

fn skipped(reason: SkipReason, fingerprint: Option<String>) -> StoreOutcome {
    StoreOutcome::Skipped {
        reason,
        fingerprint,
    }
}

/// Await `fut` unless `cancel` fires first.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    fut: impl Future<Output = CuratorResult<T>>,
) -> CuratorResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!(operation, "Ingestion cancelled");
            Err(IngestError::new(IngestErrorKind::Cancelled(operation)).into())
        }
        result = fut => result,
    }
}

/// A cancellable metadata call whose failure is tagged with its operation.
async fn store_call<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    fut: impl Future<Output = CuratorResult<T>>,
) -> CuratorResult<T> {
    until_cancelled(cancel, operation, async {
        fut.await.map_err(|e| {
            tracing::error!(operation, error = %e, "Metadata store call failed");
            CuratorError::from(IngestError::new(IngestErrorKind::Store {
                operation,
                message: e.to_string(),
            }))
        })
    })
    .await
}
