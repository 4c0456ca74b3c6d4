//! Store and pipeline wiring from configuration.

use crate::CuratorConfig;
use curator_database::{MetadataStore, open_metadata_store};
use curator_error::CuratorResult;
use curator_ingest::{CountsPublisher, GalleryService};
use curator_normalize::{ImageProcessor, WebpNormalizer};
use curator_storage::{BlobStore, open_blob_store};
use std::sync::Arc;

/// Configured stores plus the services built on them.
///
/// # Examples
///
/// ```
/// use curator::{BlobBackend, CuratorConfig, DatabaseBackend, Gallery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CuratorConfig::default()
///     .with_database(curator::DatabaseConfig::default().with_backend(DatabaseBackend::Memory))
///     .with_blob(curator::BlobConfig::default().with_backend(BlobBackend::Memory));
/// let gallery = Gallery::open(&config).await?;
/// assert_eq!(gallery.metadata().backend(), "memory");
/// # Ok(())
/// # }
/// ```
pub struct Gallery {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    service: GalleryService,
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("metadata", &self.metadata.backend())
            .field("blobs", &self.blobs.backend())
            .field("service", &self.service)
            .finish()
    }
}

impl Gallery {
    /// Open both stores and build the ingestion service.
    ///
    /// # Errors
    ///
    /// Returns any error from opening the metadata or blob store.
    #[tracing::instrument(skip(config))]
    pub async fn open(config: &CuratorConfig) -> CuratorResult<Self> {
        let metadata = open_metadata_store(config.database()).await?;
        let blobs = open_blob_store(config.blob()).await?;
        let processor: Arc<dyn ImageProcessor> =
            Arc::new(WebpNormalizer::from_config(config.normalize()));
        Ok(Self::from_parts(metadata, blobs, processor, config))
    }

    /// Assemble from already-open stores and a processor.
    pub fn from_parts(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        processor: Arc<dyn ImageProcessor>,
        config: &CuratorConfig,
    ) -> Self {
        let service = GalleryService::new(metadata.clone(), blobs.clone(), processor)
            .with_config(config.ingest().clone());
        Self {
            metadata,
            blobs,
            service,
        }
    }

    /// Metadata store.
    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// Blob store.
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Ingestion service.
    pub fn service(&self) -> &GalleryService {
        &self.service
    }

    /// Publisher over the same stores.
    pub fn publisher(&self) -> CountsPublisher {
        CountsPublisher::new(self.metadata.clone(), self.blobs.clone())
    }
}
