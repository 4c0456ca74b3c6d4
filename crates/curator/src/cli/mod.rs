//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the curator binary.

mod admin;
mod commands;
mod ingest;

pub use admin::{block_source, migrate, publish_counts, show_counts, unblock_source};
pub use commands::{Cli, Commands};
pub use ingest::{IngestArgs, ingest_file, prepare_file};
