//! Blob key derivation and record id selection.

use crate::{CANONICAL_EXTENSION, Orientation};

/// Namespace prepended to every gallery blob key.
pub const DEFAULT_KEY_PREFIX: &str = "ri";

/// Number of fingerprint hex characters kept in a hash-derived id.
const HASH_ID_LEN: usize = 24;

/// Derive the blob key for an orientation and sequence.
///
/// # Examples
///
/// ```
/// use curator_core::{Orientation, blob_key};
///
/// assert_eq!(blob_key("ri", Orientation::Horizontal, 12), "ri/h/12.webp");
/// assert_eq!(blob_key("", Orientation::Vertical, 3), "v/3.webp");
/// ```
pub fn blob_key(prefix: &str, orientation: Orientation, seq: i64) -> String {
    let prefix = prefix.trim().trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}.{}", orientation, seq, CANONICAL_EXTENSION)
    } else {
        format!("{}/{}/{}.{}", prefix, orientation, seq, CANONICAL_EXTENSION)
    }
}

/// Choose a record id: caller id, then source key, then a fingerprint
/// prefix, then a timestamp.
///
/// # Examples
///
/// ```
/// use curator_core::pick_id;
///
/// assert_eq!(pick_id(Some("custom"), "src", "abc"), "custom");
/// assert_eq!(pick_id(None, "src", "abc"), "src");
/// assert_eq!(pick_id(Some(" "), "", "abc"), "sha256_abc");
/// ```
pub fn pick_id(preferred: Option<&str>, source_key: &str, sha256: &str) -> String {
    if let Some(id) = preferred.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    let source_key = source_key.trim();
    if !source_key.is_empty() {
        return source_key.to_string();
    }
    let sha256 = sha256.trim();
    if !sha256.is_empty() {
        let end = sha256
            .char_indices()
            .nth(HASH_ID_LEN)
            .map(|(i, _)| i)
            .unwrap_or(sha256.len());
        return format!("sha256_{}", &sha256[..end]);
    }
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("img_{}", nanos)
}
