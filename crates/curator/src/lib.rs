//! Curator - deduplicating image gallery ingestion
//!
//! Curator takes raw images from any source adapter (chat exports, feeds,
//! manual uploads), normalizes them to WebP, drops blocked sources and
//! duplicates by source key and by content fingerprint, numbers each new
//! image within its orientation and commits it to a blob store and a
//! metadata store.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use curator::{CuratorConfig, Gallery, StoreInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CuratorConfig::load(None)?;
//!     let gallery = Gallery::open(&config).await?;
//!
//!     let raw = std::fs::read("cat.png")?;
//!     let outcome = gallery
//!         .service()
//!         .store_to_gallery(StoreInput::new("manual:cat.png", raw).with_source("manual"))
//!         .await?;
//!     println!("{}", outcome.summary("manual"));
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `curator_error` - Error types
//! - `curator_core` - Domain types (records, inputs, outcomes)
//! - `curator_normalize` - WebP normalization and encoders
//! - `curator_storage` - Blob stores (S3, filesystem, memory)
//! - `curator_database` - Metadata stores (Postgres, memory)
//! - `curator_ingest` - Ingestion orchestrator and counts publisher
//!
//! This crate re-exports everything and adds configuration loading,
//! logging setup and the `curator` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod gallery;
mod observability;

pub use config::{CuratorConfig, ENV_PREFIX, LoggingConfig};
pub use gallery::Gallery;
pub use observability::{ObservabilityConfig, init_observability};

pub use curator_core::*;
pub use curator_database::*;
pub use curator_error::*;
pub use curator_ingest::*;
pub use curator_normalize::*;
pub use curator_storage::*;
