//! Publishing gallery counts for the static front end.
//!
//! The front end picks a random image by drawing a sequence number below
//! the published count, so counts come from the sequence high-water mark
//! rather than from active rows.

use curator_core::{GalleryCounts, Orientation};
use curator_database::MetadataStore;
use curator_error::{CuratorError, CuratorResult, IngestError, IngestErrorKind, JsonError};
use serde::Serialize;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// JSON counts object.
pub const COUNTS_OBJECT: &str = "counts.json";
/// Script that must carry the counts.
pub const RANDOM_SCRIPT: &str = "random.js";
/// Script that carries the counts when present.
pub const RANDOM_IMAGE_SCRIPT: &str = "random-img-only.js";

const COUNTS_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const COUNTS_CACHE_CONTROL: &str = "public, max-age=30";
const SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";
const SCRIPT_CACHE_CONTROL: &str = "public, max-age=60";

const COUNTS_ASSIGNMENT: &str = r"(?:var|const|let)\s+counts\s*=\s*\{[^;]*\}\s*;";

/// An object that was left unchanged, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedObject {
    /// Object key
    pub object: String,
    /// Failure text
    pub reason: String,
}

/// What a publish run changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    /// Published counts
    pub counts: GalleryCounts,
    /// Objects written
    pub updated: Vec<String>,
    /// Optional objects that could not be written
    pub skipped: Vec<SkippedObject>,
}

impl std::fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut files = self.updated.clone();
        files.extend(
            self.skipped
                .iter()
                .map(|s| format!("{}(skip:{})", s.object, s.reason)),
        );
        write!(
            f,
            "metadata updated\ncounts: h={} v={}\nfiles: {}",
            self.counts.h,
            self.counts.v,
            files.join(", ")
        )
    }
}

/// Replace every `counts` assignment in `script` with the given counts.
///
/// Returns `None` when the script has no assignment to patch.
///
/// # Examples
///
/// ```
/// use curator_core::GalleryCounts;
/// use curator_ingest::patch_counts_assignment;
///
/// let script = "const counts = { h: 1, v: 2 };\npick(counts);";
/// let patched = patch_counts_assignment(script, GalleryCounts::new(10, 20))
///     .unwrap()
///     .unwrap();
/// assert_eq!(patched, "var counts = {\"h\":10,\"v\":20};\npick(counts);");
/// ```
pub fn patch_counts_assignment(
    script: &str,
    counts: GalleryCounts,
) -> CuratorResult<Option<String>> {
    let pattern = regex::Regex::new(COUNTS_ASSIGNMENT).map_err(|e| {
        IngestError::new(IngestErrorKind::Publish {
            object: "counts pattern".to_string(),
            message: e.to_string(),
        })
    })?;
    if !pattern.is_match(script) {
        return Ok(None);
    }

    let json = serde_json::to_string(&counts).map_err(|e| JsonError::encoding("counts literal", e))?;
    let replacement = format!("var counts = {};", json);
    Ok(Some(
        pattern
            .replace_all(script, regex::NoExpand(&replacement))
            .into_owned(),
    ))
}

/// Writes `counts.json` and patches the front-end scripts.
pub struct CountsPublisher {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn curator_storage::BlobStore>,
}

impl std::fmt::Debug for CountsPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountsPublisher")
            .field("metadata", &self.metadata.backend())
            .field("blobs", &self.blobs.backend())
            .finish()
    }
}

impl CountsPublisher {
    /// Create a publisher over the gallery stores.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn curator_storage::BlobStore>,
    ) -> Self {
        Self { metadata, blobs }
    }

    /// Highest allocated sequence per orientation, gaps included.
    ///
    /// # Errors
    ///
    /// Returns `Store` if a sequence query fails.
    pub async fn counts_by_sequence(&self) -> CuratorResult<GalleryCounts> {
        let mut counts = GalleryCounts::default();
        for orientation in Orientation::iter() {
            let next = self
                .metadata
                .next_sequence(orientation)
                .await
                .map_err(|e| {
                    IngestError::new(IngestErrorKind::Store {
                        operation: "next_sequence",
                        message: e.to_string(),
                    })
                })?;
            counts.set(orientation, (next - 1).max(0));
        }
        Ok(counts)
    }

    /// Publish counts to every front-end object.
    ///
    /// `counts.json` and `random.js` are required; a failure on
    /// `random-img-only.js` is recorded in the summary instead.
    ///
    /// # Errors
    ///
    /// Returns `Publish` naming the first required object that failed.
    #[tracing::instrument(skip(self))]
    pub async fn publish(&self) -> CuratorResult<PublishSummary> {
        let counts = self.counts_by_sequence().await?;
        let mut summary = PublishSummary {
            counts,
            updated: Vec::new(),
            skipped: Vec::new(),
        };

        let json = serde_json::to_vec(&counts).map_err(|e| JsonError::encoding(COUNTS_OBJECT, e))?;
        self.blobs
            .put_with_cache_control(
                COUNTS_OBJECT,
                json.into(),
                COUNTS_CONTENT_TYPE,
                COUNTS_CACHE_CONTROL,
            )
            .await
            .map_err(|e| publish_error(COUNTS_OBJECT, &e))?;
        summary.updated.push(COUNTS_OBJECT.to_string());

        self.patch_script(RANDOM_SCRIPT, counts).await?;
        summary.updated.push(RANDOM_SCRIPT.to_string());

        match self.patch_script(RANDOM_IMAGE_SCRIPT, counts).await {
            Ok(()) => summary.updated.push(RANDOM_IMAGE_SCRIPT.to_string()),
            Err(e) => {
                tracing::warn!(object = RANDOM_IMAGE_SCRIPT, error = %e, "Skipping optional script");
                summary.skipped.push(SkippedObject {
                    object: RANDOM_IMAGE_SCRIPT.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        tracing::info!(h = counts.h, v = counts.v, updated = ?summary.updated, "Published gallery counts");
        Ok(summary)
    }

    async fn patch_script(&self, object: &str, counts: GalleryCounts) -> CuratorResult<()> {
        let blob = self
            .blobs
            .get(object)
            .await
            .map_err(|e| publish_error(object, &e))?;
        let script = String::from_utf8(blob.data.to_vec()).map_err(|e| {
            IngestError::new(IngestErrorKind::Publish {
                object: object.to_string(),
                message: e.to_string(),
            })
        })?;

        let patched = patch_counts_assignment(&script, counts)?.ok_or_else(|| {
            IngestError::new(IngestErrorKind::Publish {
                object: object.to_string(),
                message: "counts assignment not found".to_string(),
            })
        })?;

        self.blobs
            .put_with_cache_control(
                object,
                patched.into_bytes().into(),
                SCRIPT_CONTENT_TYPE,
                SCRIPT_CACHE_CONTROL,
            )
            .await
            .map_err(|e| publish_error(object, &e))?;
        tracing::debug!(object, "Patched counts assignment");
        Ok(())
    }
}

#[track_caller]
fn publish_error(object: &str, err: &CuratorError) -> IngestError {
    IngestError::new(IngestErrorKind::Publish {
        object: object.to_string(),
        message: err.to_string(),
    })
}
