//! The persisted gallery record and aggregate counts.

use crate::Orientation;
use serde::{Deserialize, Serialize};

/// Lifecycle tag of a gallery record. Only `active` records are counted.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum ImageStatus {
    /// Visible in the gallery
    #[default]
    #[display("active")]
    Active,
    /// Withheld by moderation
    #[display("hidden")]
    Hidden,
    /// Removed by moderation
    #[display("removed")]
    Removed,
}

impl ImageStatus {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Active => "active",
            ImageStatus::Hidden => "hidden",
            ImageStatus::Removed => "removed",
        }
    }
}

impl std::str::FromStr for ImageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "active" => Ok(ImageStatus::Active),
            "hidden" => Ok(ImageStatus::Hidden),
            "removed" => Ok(ImageStatus::Removed),
            other => Err(format!("Unknown image status: {}", other)),
        }
    }
}

/// A stored gallery image.
///
/// Records are created by the ingestion orchestrator once every dedup check
/// has passed and the canonical bytes are in the blob store. This crate
/// never mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Record identifier
    pub id: String,
    /// Origin tag (e.g. `telegram`, `pixiv`)
    pub source: String,
    /// Globally unique key of the originating unit of content
    pub source_key: String,
    /// Link back to the origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Post identifier at the origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_post_id: Option<String>,
    /// Lowercase hex SHA-256 of the canonical bytes
    pub sha256: String,
    /// Sequence partition
    pub orientation: Orientation,
    /// Position within the orientation, starting at 1
    pub seq: i64,
    /// Blob store key holding the canonical bytes
    pub blob_key: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Canonical payload size
    pub bytes: u64,
    /// Canonical MIME type
    pub mime_type: String,
    /// Publication time at the origin (epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
    /// Collection time (epoch seconds)
    pub collected_at: i64,
    /// Lifecycle tag
    #[serde(default)]
    pub status: ImageStatus,
}

/// Active record counts per orientation.
///
/// # Examples
///
/// ```
/// use curator_core::{GalleryCounts, Orientation};
///
/// let counts = GalleryCounts::new(3, 9);
/// assert_eq!(counts.get(Orientation::Vertical), 9);
/// assert_eq!(counts.total(), 12);
/// assert_eq!(serde_json::to_string(&counts).unwrap(), r#"{"h":3,"v":9}"#);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryCounts {
    /// Horizontal count
    pub h: i64,
    /// Vertical count
    pub v: i64,
}

impl GalleryCounts {
    /// Create counts from per-orientation values.
    pub fn new(h: i64, v: i64) -> Self {
        Self { h, v }
    }

    /// Count for one orientation.
    pub fn get(&self, orientation: Orientation) -> i64 {
        match orientation {
            Orientation::Horizontal => self.h,
            Orientation::Vertical => self.v,
        }
    }

    /// Set the count for one orientation.
    pub fn set(&mut self, orientation: Orientation, value: i64) {
        match orientation {
            Orientation::Horizontal => self.h = value,
            Orientation::Vertical => self.v = value,
        }
    }

    /// Sum over both orientations.
    pub fn total(&self) -> i64 {
        self.h + self.v
    }
}
