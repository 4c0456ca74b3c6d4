//! Result of one ingestion call.

use crate::{GalleryCounts, GalleryImage};
use serde::{Deserialize, Serialize};

/// Why an image was not stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An operator blocked the source key
    #[display("blocked_source")]
    BlockedSource,
    /// A record with this source key exists
    #[display("duplicate_source")]
    DuplicateSource,
    /// A record with this fingerprint exists
    #[display("duplicate_hash")]
    DuplicateHash,
    /// Another call committed the source key while this one waited for the lock
    #[display("duplicate_source_race")]
    DuplicateSourceRace,
    /// Another call committed the fingerprint while this one waited for the lock
    #[display("duplicate_hash_race")]
    DuplicateHashRace,
}

impl SkipReason {
    /// Whether the duplicate was only detected inside the critical section.
    pub fn is_race(&self) -> bool {
        matches!(
            self,
            SkipReason::DuplicateSourceRace | SkipReason::DuplicateHashRace
        )
    }
}

/// Outcome of a successful (non-error) ingestion call.
///
/// Serializes to the flat notification shape
/// `{"added":true,"image":{..},"counts":{..},"fingerprint":".."}` or
/// `{"added":false,"reason":"..","fingerprint":".."}`.
///
/// # Examples
///
/// ```
/// use curator_core::{SkipReason, StoreOutcome};
///
/// let outcome = StoreOutcome::Skipped {
///     reason: SkipReason::DuplicateHash,
///     fingerprint: Some("ab12".into()),
/// };
/// assert!(!outcome.added());
/// assert_eq!(outcome.summary("tg"), "tg: skipped (duplicate_hash)");
/// assert_eq!(
///     serde_json::to_string(&outcome).unwrap(),
///     r#"{"added":false,"reason":"duplicate_hash","fingerprint":"ab12"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OutcomeRecord", try_from = "OutcomeRecord")]
pub enum StoreOutcome {
    /// The image was uploaded and recorded
    Added {
        /// Inserted record
        image: GalleryImage,
        /// Active counts after the insert; absent if the count query failed
        counts: Option<GalleryCounts>,
        /// Fingerprint of the canonical bytes
        fingerprint: String,
    },
    /// The image was not stored
    Skipped {
        /// Why
        reason: SkipReason,
        /// Fingerprint, when normalization ran before the skip
        fingerprint: Option<String>,
    },
}

impl StoreOutcome {
    /// Whether a new record was created.
    pub fn added(&self) -> bool {
        matches!(self, StoreOutcome::Added { .. })
    }

    /// Skip reason, if skipped.
    pub fn reason(&self) -> Option<SkipReason> {
        match self {
            StoreOutcome::Added { .. } => None,
            StoreOutcome::Skipped { reason, .. } => Some(*reason),
        }
    }

    /// Inserted record, if added.
    pub fn image(&self) -> Option<&GalleryImage> {
        match self {
            StoreOutcome::Added { image, .. } => Some(image),
            StoreOutcome::Skipped { .. } => None,
        }
    }

    /// Counts reported with an added image.
    pub fn counts(&self) -> Option<GalleryCounts> {
        match self {
            StoreOutcome::Added { counts, .. } => *counts,
            StoreOutcome::Skipped { .. } => None,
        }
    }

    /// Fingerprint of the canonical bytes, when known.
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            StoreOutcome::Added { fingerprint, .. } => Some(fingerprint),
            StoreOutcome::Skipped { fingerprint, .. } => fingerprint.as_deref(),
        }
    }

    /// One-line human summary for chat notifications and logs.
    pub fn summary(&self, prefix: &str) -> String {
        match self {
            StoreOutcome::Added {
                image,
                counts: Some(counts),
                ..
            } => format!(
                "{}: stored {}/{} (counts h={} v={})",
                prefix, image.orientation, image.seq, counts.h, counts.v
            ),
            StoreOutcome::Added { image, .. } => {
                format!("{}: stored {}/{}", prefix, image.orientation, image.seq)
            }
            StoreOutcome::Skipped { reason, .. } => format!("{}: skipped ({})", prefix, reason),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OutcomeRecord {
    added: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<GalleryImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    counts: Option<GalleryCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<SkipReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
}

impl From<StoreOutcome> for OutcomeRecord {
    fn from(outcome: StoreOutcome) -> Self {
        match outcome {
            StoreOutcome::Added {
                image,
                counts,
                fingerprint,
            } => OutcomeRecord {
                added: true,
                image: Some(image),
                counts,
                reason: None,
                fingerprint: Some(fingerprint),
            },
            StoreOutcome::Skipped {
                reason,
                fingerprint,
            } => OutcomeRecord {
                added: false,
                image: None,
                counts: None,
                reason: Some(reason),
                fingerprint,
            },
        }
    }
}

impl TryFrom<OutcomeRecord> for StoreOutcome {
    type Error = String;

    fn try_from(record: OutcomeRecord) -> Result<Self, Self::Error> {
        if record.added {
            let image = record.image.ok_or("added outcome without image")?;
            let fingerprint = record
                .fingerprint
                .unwrap_or_else(|| image.sha256.clone());
            Ok(StoreOutcome::Added {
                image,
                counts: record.counts,
                fingerprint,
            })
        } else {
            let reason = record.reason.ok_or("skipped outcome without reason")?;
            Ok(StoreOutcome::Skipped {
                reason,
                fingerprint: record.fingerprint,
            })
        }
    }
}
