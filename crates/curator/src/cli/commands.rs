//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Curator - deduplicating image gallery ingestion
#[derive(Parser, Debug)]
#[command(name = "curator")]
#[command(about = "Normalize, deduplicate and publish gallery images", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file, applied over ~/.config/curator and ./curator.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store one image in the gallery
    Ingest {
        /// Image file in any supported format
        file: PathBuf,

        /// Unique key of the originating unit of content
        #[arg(long)]
        source_key: String,

        /// Origin tag
        #[arg(long)]
        source: Option<String>,

        /// Link back to the origin
        #[arg(long)]
        source_url: Option<String>,

        /// Post identifier at the origin
        #[arg(long)]
        post_id: Option<String>,

        /// Preferred record id
        #[arg(long)]
        id: Option<String>,

        /// Publication time at the origin (epoch seconds)
        #[arg(long)]
        published_at: Option<i64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize an image without storing it
    Prepare {
        /// Image file in any supported format
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Block a source key from future ingestion
    Block {
        /// Source key to block
        key: String,

        /// Why it was blocked
        #[arg(long)]
        reason: Option<String>,
    },

    /// Remove a source key from the blocklist
    Unblock {
        /// Source key to unblock
        key: String,
    },

    /// Show active image counts per orientation
    Counts {
        /// Print the counts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Push counts to counts.json and the front-end scripts
    Publish {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply pending metadata migrations
    Migrate,
}
