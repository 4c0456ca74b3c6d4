//! Gallery metadata storage for Curator.
//!
//! This crate defines the [`MetadataStore`] contract the ingestion pipeline
//! depends on, plus two implementations:
//!
//! - [`PostgresMetadataStore`]: diesel over an r2d2 pool, schema managed by
//!   embedded migrations
//! - [`InMemoryMetadataStore`]: process-local, for tests and dry runs
//!
//! Both normalize records the same way and reject duplicates of any unique
//! field with `DatabaseErrorKind::UniqueViolation`.
//!
//! # Example
//!
//! ```
//! use curator_core::Orientation;
//! use curator_database::{InMemoryMetadataStore, MetadataStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryMetadataStore::new();
//! assert_eq!(store.next_sequence(Orientation::Vertical).await?, 1);
//! assert!(store.block_source("tg:1:1", Some("spam")).await?);
//! assert!(store.is_blocked("tg:1:1").await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod memory;
mod postgres;
mod record;
mod store;

#[allow(missing_docs)]
pub mod models;
#[allow(missing_docs)]
pub mod schema;

pub use config::{DatabaseBackend, DatabaseConfig, open_metadata_store};
pub use memory::InMemoryMetadataStore;
pub use postgres::{PgPool, PostgresMetadataStore, run_migrations};
pub use record::normalize_record;
pub use store::MetadataStore;
