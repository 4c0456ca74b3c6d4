//! Error types for the Curator gallery ingestion pipeline.
//!
//! This crate provides the foundation error types used throughout the Curator workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every domain error converts into [`CuratorError`] with `?`, and
//! [`CuratorError::category`] sorts any failure into the pipeline's taxonomy
//! (validation, codec, store I/O, cancellation, configuration).
//!
//! # Examples
//!
//! ```
//! use curator_error::{CuratorResult, ErrorCategory, IngestError, IngestErrorKind};
//!
//! fn check_key(key: &str) -> CuratorResult<()> {
//!     if key.trim().is_empty() {
//!         Err(IngestError::new(IngestErrorKind::MissingSourceKey))?
//!     }
//!     Ok(())
//! }
//!
//! let err = check_key("  ").unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Validation);
//! assert!(!err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod ingest;
mod json;
mod normalize;
mod storage;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{CuratorError, CuratorErrorKind, CuratorResult, ErrorCategory};
pub use ingest::{IngestError, IngestErrorKind};
pub use json::JsonError;
pub use normalize::{NormalizeError, NormalizeErrorKind};
pub use storage::{StorageError, StorageErrorKind};
