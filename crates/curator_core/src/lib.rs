//! Core domain types for the Curator gallery ingestion pipeline.
//!
//! This crate provides the data types shared by the normalizer, the stores
//! and the ingestion orchestrator: the persisted [`GalleryImage`] record,
//! the transient [`PreparedImage`], the [`StoreInput`] a caller submits and
//! the [`StoreOutcome`] it gets back.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod image;
mod input;
mod keys;
mod orientation;
mod outcome;
mod prepared;

pub use image::{GalleryCounts, GalleryImage, ImageStatus};
pub use input::StoreInput;
pub use keys::{DEFAULT_KEY_PREFIX, blob_key, pick_id};
pub use orientation::Orientation;
pub use outcome::{SkipReason, StoreOutcome};
pub use prepared::{
    CANONICAL_EXTENSION, CANONICAL_MIME, NormalizeMode, PreparedImage, fingerprint,
};
