//! Curator CLI binary.
//!
//! This binary provides command-line access to the gallery pipeline:
//! - Ingest or dry-run normalize image files
//! - Manage the source blocklist
//! - Inspect and publish gallery counts
//! - Apply metadata migrations

use clap::Parser;
use curator::{CuratorConfig, ObservabilityConfig, init_observability};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, IngestArgs, block_source, ingest_file, migrate, prepare_file,
        publish_counts, show_counts, unblock_source,
    };

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = CuratorConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    let mut observability = ObservabilityConfig::from_logging("curator", config.logging());
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability(&observability)?;

    // Execute the requested command
    match cli.command {
        Commands::Ingest {
            file,
            source_key,
            source,
            source_url,
            post_id,
            id,
            published_at,
            json,
        } => {
            let args = IngestArgs {
                file,
                source_key,
                source,
                source_url,
                post_id,
                id,
                published_at,
            };
            ingest_file(&config, args, json).await?;
        }

        Commands::Prepare { file, json } => {
            prepare_file(&config, &file, json).await?;
        }

        Commands::Block { key, reason } => {
            block_source(&config, &key, reason.as_deref()).await?;
        }

        Commands::Unblock { key } => {
            unblock_source(&config, &key).await?;
        }

        Commands::Counts { json } => {
            show_counts(&config, json).await?;
        }

        Commands::Publish { json } => {
            publish_counts(&config, json).await?;
        }

        Commands::Migrate => {
            migrate(&config).await?;
        }
    }

    Ok(())
}
