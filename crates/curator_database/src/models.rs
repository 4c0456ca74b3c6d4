//! Diesel models for gallery records and the blocklist.

use curator_core::{GalleryImage, ImageStatus, Orientation};
use curator_error::{DatabaseError, DatabaseErrorKind};
use diesel::prelude::*;

/// Database row for the `gallery_images` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::gallery_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GalleryImageRow {
    pub id: String,
    pub source: String,
    pub source_key: String,
    pub source_url: Option<String>,
    pub source_post_id: Option<String>,
    pub sha256: String,
    pub orientation: String,
    pub seq: i64,
    pub blob_key: String,
    pub width: i32,
    pub height: i32,
    pub bytes: i64,
    pub mime_type: String,
    pub published_at: Option<i64>,
    pub collected_at: i64,
    pub status: String,
}

/// Insertable blocklist entry; `created_at` defaults in the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::ingest_blocklist)]
pub struct NewBlocklistRow {
    pub block_key: String,
    pub reason: Option<String>,
}

impl TryFrom<&GalleryImage> for GalleryImageRow {
    type Error = DatabaseError;

    fn try_from(image: &GalleryImage) -> Result<Self, Self::Error> {
        let column = |name: &str| {
            DatabaseError::new(DatabaseErrorKind::InvalidRecord(format!(
                "{} out of range",
                name
            )))
        };

        Ok(Self {
            id: image.id.clone(),
            source: image.source.clone(),
            source_key: image.source_key.clone(),
            source_url: image.source_url.clone(),
            source_post_id: image.source_post_id.clone(),
            sha256: image.sha256.clone(),
            orientation: image.orientation.as_str().to_string(),
            seq: image.seq,
            blob_key: image.blob_key.clone(),
            width: i32::try_from(image.width).map_err(|_| column("width"))?,
            height: i32::try_from(image.height).map_err(|_| column("height"))?,
            bytes: i64::try_from(image.bytes).map_err(|_| column("bytes"))?,
            mime_type: image.mime_type.clone(),
            published_at: image.published_at,
            collected_at: image.collected_at,
            status: image.status.as_str().to_string(),
        })
    }
}

impl TryFrom<GalleryImageRow> for GalleryImage {
    type Error = DatabaseError;

    fn try_from(row: GalleryImageRow) -> Result<Self, Self::Error> {
        let corrupt = |detail: String| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "corrupt gallery_images row {}: {}",
                row.id, detail
            )))
        };

        let orientation = row
            .orientation
            .parse::<Orientation>()
            .map_err(&corrupt)?;
        let status = row.status.parse::<ImageStatus>().map_err(&corrupt)?;
        let width = u32::try_from(row.width).map_err(|e| corrupt(e.to_string()))?;
        let height = u32::try_from(row.height).map_err(|e| corrupt(e.to_string()))?;
        let bytes = u64::try_from(row.bytes).map_err(|e| corrupt(e.to_string()))?;

        Ok(GalleryImage {
            id: row.id,
            source: row.source,
            source_key: row.source_key,
            source_url: row.source_url,
            source_post_id: row.source_post_id,
            sha256: row.sha256,
            orientation,
            seq: row.seq,
            blob_key: row.blob_key,
            width,
            height,
            bytes,
            mime_type: row.mime_type,
            published_at: row.published_at,
            collected_at: row.collected_at,
            status,
        })
    }
}
