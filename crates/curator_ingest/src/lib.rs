//! Deduplicating gallery ingestion for Curator.
//!
//! [`GalleryService`] takes raw images from any source adapter, normalizes
//! them to WebP, rejects blocked sources and duplicates, assigns each new
//! image the next sequence number for its orientation and commits it to
//! the blob and metadata stores. [`CountsPublisher`] pushes the resulting
//! per-orientation counts to the static front end.
//!
//! # Consistency
//!
//! The blob is uploaded before the record is inserted. If the insert fails
//! the blob is deleted again on a task with its own timeout, so a record
//! never points at a missing blob while the pipeline is the only writer.
//! Sequences are allocated as `max(seq) + 1`, so a failed attempt at the
//! top of an orientation leaves no trace and its number is handed out again.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod publish;
mod service;

pub use config::IngestConfig;
pub use publish::{
    COUNTS_OBJECT, CountsPublisher, PublishSummary, RANDOM_IMAGE_SCRIPT, RANDOM_SCRIPT,
    SkippedObject, patch_counts_assignment,
};
pub use service::GalleryService;
