//! Blocklist, counts, publishing and migration handlers.

use curator::{
    CuratorConfig, CuratorResult, DatabaseBackend, Gallery, JsonError, PostgresMetadataStore,
    open_metadata_store,
};

/// Block a source key.
pub async fn block_source(config: &CuratorConfig, key: &str, reason: Option<&str>) -> CuratorResult<()> {
    let metadata = open_metadata_store(config.database()).await?;
    if metadata.block_source(key, reason).await? {
        println!("blocked {}", key.trim());
    } else {
        println!("nothing to block: key is blank");
    }
    Ok(())
}

/// Unblock a source key.
pub async fn unblock_source(config: &CuratorConfig, key: &str) -> CuratorResult<()> {
    let metadata = open_metadata_store(config.database()).await?;
    if metadata.unblock_source(key).await? {
        println!("unblocked {}", key.trim());
    } else {
        println!("{} was not blocked", key.trim());
    }
    Ok(())
}

/// Print active counts per orientation.
pub async fn show_counts(config: &CuratorConfig, json: bool) -> CuratorResult<()> {
    let metadata = open_metadata_store(config.database()).await?;
    let counts = metadata.count_active_by_orientation().await?;
    if json {
        let rendered =
            serde_json::to_string(&counts).map_err(|e| JsonError::encoding("counts", e))?;
        println!("{}", rendered);
    } else {
        println!("h={} v={} total={}", counts.h, counts.v, counts.total());
    }
    Ok(())
}

/// Publish counts to the front-end objects.
pub async fn publish_counts(config: &CuratorConfig, json: bool) -> CuratorResult<()> {
    let gallery = Gallery::open(config).await?;
    let summary = gallery.publisher().publish().await?;
    if json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| JsonError::encoding("publish summary", e))?;
        println!("{}", rendered);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

/// Apply pending migrations.
pub async fn migrate(config: &CuratorConfig) -> CuratorResult<()> {
    if *config.database().backend() == DatabaseBackend::Memory {
        println!("memory backend has no schema to migrate");
        return Ok(());
    }

    let database = config.database().clone().with_run_migrations(false);
    let store = PostgresMetadataStore::connect(&database).await?;
    let applied = store.migrate().await?;
    if applied.is_empty() {
        println!("schema is up to date");
    } else {
        for name in &applied {
            println!("applied {}", name);
        }
    }
    Ok(())
}
