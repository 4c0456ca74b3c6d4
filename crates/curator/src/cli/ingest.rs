//! Ingestion command handlers.

use curator::{
    CuratorConfig, CuratorResult, Gallery, ImageProcessor, JsonError, StorageError,
    StorageErrorKind, StoreInput, WebpNormalizer,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Arguments of `curator ingest`.
#[derive(Debug, Clone)]
pub struct IngestArgs {
    /// Image file
    pub file: PathBuf,
    /// Unique key of the originating unit of content
    pub source_key: String,
    /// Origin tag
    pub source: Option<String>,
    /// Link back to the origin
    pub source_url: Option<String>,
    /// Post identifier at the origin
    pub post_id: Option<String>,
    /// Preferred record id
    pub id: Option<String>,
    /// Publication time (epoch seconds)
    pub published_at: Option<i64>,
}

impl IngestArgs {
    fn into_input(self, raw: Vec<u8>) -> StoreInput {
        let mut input = StoreInput::new(self.source_key, raw);
        input.source = self.source.unwrap_or_default();
        input.source_url = self.source_url;
        input.source_post_id = self.post_id;
        input.id = self.id;
        input.published_at = self.published_at;
        input
    }
}

/// Store one image file and print the outcome.
///
/// Ctrl-C cancels the call; a record that was already inserted stays.
pub async fn ingest_file(config: &CuratorConfig, args: IngestArgs, json: bool) -> CuratorResult<()> {
    let raw = read_image(&args.file).await?;
    let gallery = Gallery::open(config).await?;

    let prefix = args
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("curator")
        .to_string();
    let input = args.into_input(raw);

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; cancelling ingestion");
                cancel.cancel();
            }
        }
    });

    let result = gallery
        .service()
        .store_to_gallery_with_cancel(input, &cancel)
        .await;
    watcher.abort();
    let outcome = result?;

    if json {
        let rendered = serde_json::to_string_pretty(&outcome)
            .map_err(|e| JsonError::encoding("ingest outcome", e))?;
        println!("{}", rendered);
    } else {
        println!("{}", outcome.summary(&prefix));
    }
    Ok(())
}

/// Normalize one image file and print what would be stored.
///
/// Touches neither store.
pub async fn prepare_file(config: &CuratorConfig, file: &Path, json: bool) -> CuratorResult<()> {
    let raw = read_image(file).await?;
    let prepared = WebpNormalizer::from_config(config.normalize())
        .prepare(&raw)
        .await?;

    if json {
        let rendered = serde_json::to_string_pretty(&prepared)
            .map_err(|e| JsonError::encoding("prepared image", e))?;
        println!("{}", rendered);
    } else {
        println!("sha256:      {}", prepared.sha256());
        println!(
            "dimensions:  {}x{} ({})",
            prepared.width(),
            prepared.height(),
            prepared.orientation()
        );
        println!("bytes:       {}", prepared.bytes());
        println!("input mime:  {}", prepared.original_mime());
        println!("mode:        {}", prepared.mode());
    }
    Ok(())
}

async fn read_image(path: &Path) -> CuratorResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()
    })
}
