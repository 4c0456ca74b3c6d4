//! Metadata store contract.

use curator_core::{GalleryCounts, GalleryImage, Orientation};
use curator_error::CuratorResult;

/// Remote metadata service consulted and updated by the ingestion pipeline.
///
/// Implementations must enforce uniqueness of `id`, `source_key`, `sha256`,
/// `blob_key` and `(orientation, seq)` inside [`insert`](Self::insert),
/// failing with `DatabaseErrorKind::UniqueViolation`. Callers serialize
/// allocation per orientation in-process; the constraint is what keeps
/// separate processes from committing the same slot twice.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Whether an operator blocked this source key. Blank keys are never
    /// blocked.
    async fn is_blocked(&self, source_key: &str) -> CuratorResult<bool>;

    /// Whether any record, in any status, carries this source key.
    async fn exists_by_source_key(&self, source_key: &str) -> CuratorResult<bool>;

    /// Whether any record, in any status, carries this fingerprint.
    async fn exists_by_fingerprint(&self, sha256: &str) -> CuratorResult<bool>;

    /// One more than the highest `seq` in use for `orientation`, or 1 when
    /// there is none.
    async fn next_sequence(&self, orientation: Orientation) -> CuratorResult<i64>;

    /// Insert a new record after normalizing it.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` when validation fails, `UniqueViolation` when any
    /// unique field is already taken.
    async fn insert(&self, image: GalleryImage) -> CuratorResult<GalleryImage>;

    /// Count `active` records per orientation.
    async fn count_active_by_orientation(&self) -> CuratorResult<GalleryCounts>;

    /// Look a record up by its source key.
    async fn get_by_source_key(&self, source_key: &str) -> CuratorResult<Option<GalleryImage>>;

    /// Block a source key. Blocking an already-blocked key replaces its
    /// reason. Returns `false` for a blank key, which is ignored.
    async fn block_source(&self, source_key: &str, reason: Option<&str>) -> CuratorResult<bool>;

    /// Remove a block. Returns whether a block existed.
    async fn unblock_source(&self, source_key: &str) -> CuratorResult<bool>;
}
