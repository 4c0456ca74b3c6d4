//! Normalizer output.

use crate::Orientation;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// MIME type every stored image is normalized to.
pub const CANONICAL_MIME: &str = "image/webp";

/// File extension matching [`CANONICAL_MIME`].
pub const CANONICAL_EXTENSION: &str = "webp";

/// How the canonical bytes were produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
    /// Input was already canonical and is stored unchanged
    #[display("pass_through")]
    PassThrough,
    /// Input was decoded and re-encoded
    #[display("transcoded")]
    Transcoded,
}

/// Canonical image ready for dedup and upload.
///
/// Exists only for the duration of one ingestion call. Serializes as a
/// report without `data`, and is never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct PreparedImage {
    /// Canonical bytes
    #[serde(skip)]
    data: Bytes,
    /// Lowercase hex SHA-256 of `data`
    sha256: String,
    /// Width of the canonical image
    width: u32,
    /// Height of the canonical image
    height: u32,
    /// Orientation derived from the canonical dimensions
    orientation: Orientation,
    /// Length of `data`
    bytes: u64,
    /// Always [`CANONICAL_MIME`]
    content_type: String,
    /// MIME type detected on the raw input
    original_mime: String,
    /// Pass-through or transcoded
    mode: NormalizeMode,
}

impl PreparedImage {
    /// Assemble a prepared image from canonical bytes and their dimensions.
    ///
    /// The fingerprint, byte count and orientation are all derived here so
    /// they can never disagree with `data`.
    pub fn new(
        data: Bytes,
        width: u32,
        height: u32,
        original_mime: impl Into<String>,
        mode: NormalizeMode,
    ) -> Self {
        Self {
            sha256: fingerprint(&data),
            bytes: data.len() as u64,
            orientation: Orientation::from_dimensions(width, height),
            data,
            width,
            height,
            content_type: CANONICAL_MIME.to_string(),
            original_mime: original_mime.into(),
            mode,
        }
    }
}

/// Lowercase hex SHA-256 of `data`.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     curator_core::fingerprint(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
