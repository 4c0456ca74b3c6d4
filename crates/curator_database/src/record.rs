//! Store-side normalization and validation of gallery records.

use curator_core::{CANONICAL_MIME, GalleryImage};
use curator_error::{DatabaseError, DatabaseErrorKind};

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a record the way every backend stores it, rejecting records
/// that would violate the gallery invariants.
///
/// Keys are trimmed, `sha256` is lower-cased, a blank `id` falls back to
/// the source key, a blank MIME type becomes `image/webp`, and a
/// non-positive `collected_at` becomes now.
///
/// # Errors
///
/// Returns `InvalidRecord` for a blank `source_key`, `sha256` or
/// `blob_key`, a `seq` below 1, or a zero dimension.
pub fn normalize_record(mut image: GalleryImage) -> Result<GalleryImage, DatabaseError> {
    trim_in_place(&mut image.id);
    trim_in_place(&mut image.source);
    trim_in_place(&mut image.source_key);
    trim_in_place(&mut image.blob_key);
    trim_in_place(&mut image.mime_type);
    image.sha256 = image.sha256.trim().to_lowercase();
    image.source_url = trim_optional(image.source_url);
    image.source_post_id = trim_optional(image.source_post_id);

    if image.source_key.is_empty() {
        return Err(invalid("source_key is required"));
    }
    if image.sha256.is_empty() {
        return Err(invalid("sha256 is required"));
    }
    if image.seq < 1 {
        return Err(invalid("seq must be >= 1"));
    }
    if image.blob_key.is_empty() {
        return Err(invalid("blob_key is required"));
    }
    if image.width == 0 || image.height == 0 {
        return Err(invalid(format!(
            "dimensions must be positive, got {}x{}",
            image.width, image.height
        )));
    }

    if image.id.is_empty() {
        image.id = image.source_key.clone();
    }
    if image.mime_type.is_empty() {
        image.mime_type = CANONICAL_MIME.to_string();
    }
    if image.collected_at <= 0 {
        image.collected_at = chrono::Utc::now().timestamp();
    }

    Ok(image)
}

#[track_caller]
fn invalid(message: impl Into<String>) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::InvalidRecord(message.into()))
}
