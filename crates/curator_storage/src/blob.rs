//! Stored object types and key validation.

use bytes::Bytes;
use curator_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};

/// Cache policy for immutable gallery objects.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Content type used when the caller supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An object read back from a blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Object bytes
    pub data: Bytes,
    /// Content type recorded at upload
    pub content_type: String,
    /// Cache-Control recorded at upload
    pub cache_control: Option<String>,
}

/// Object attributes without the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobHead {
    /// Payload length
    pub size: u64,
    /// Content type recorded at upload
    pub content_type: String,
    /// Cache-Control recorded at upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

/// Trimmed key, or `InvalidKey` when blank.
#[track_caller]
pub(crate) fn require_key(key: &str) -> Result<&str, StorageError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(StorageError::new(StorageErrorKind::InvalidKey(
            "blob key is blank".to_string(),
        )));
    }
    Ok(key)
}

/// Trimmed content type, or [`DEFAULT_CONTENT_TYPE`] when blank.
pub(crate) fn content_type_or_default(content_type: &str) -> &str {
    match content_type.trim() {
        "" => DEFAULT_CONTENT_TYPE,
        ct => ct,
    }
}

/// Trimmed cache policy, or `None` when blank.
pub(crate) fn cache_control_or_none(cache_control: &str) -> Option<String> {
    match cache_control.trim() {
        "" => None,
        cc => Some(cc.to_string()),
    }
}
