//! Blob storage backends for the Curator gallery ingestion pipeline.
//!
//! The gallery keeps canonical image bytes in a key/value blob store and
//! the records describing them in a separate metadata store. This crate
//! provides the blob side.
//!
//! # Backends
//!
//! - [`S3BlobStore`]: any S3-compatible service (AWS, Cloudflare R2, MinIO)
//! - [`FileSystemBlobStore`]: a directory tree, with atomic writes
//! - [`MemoryBlobStore`]: in-process map for tests and dry runs
//!
//! # Example
//!
//! ```rust
//! use curator_storage::{BlobStore, MemoryBlobStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryBlobStore::new();
//! store.put("ri/h/1.webp", vec![1, 2, 3].into(), "image/webp").await?;
//!
//! let blob = store.get("ri/h/1.webp").await?;
//! assert_eq!(blob.content_type, "image/webp");
//!
//! // Deleting twice is fine
//! store.delete("ri/h/1.webp").await?;
//! store.delete("ri/h/1.webp").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod config;
mod filesystem;
mod memory;
mod s3;
mod store;

pub use blob::{BlobHead, DEFAULT_CACHE_CONTROL, DEFAULT_CONTENT_TYPE, StoredBlob};
pub use config::{BlobBackend, BlobConfig, open_blob_store};
pub use curator_error::{StorageError, StorageErrorKind};
pub use filesystem::FileSystemBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;
pub use store::BlobStore;
