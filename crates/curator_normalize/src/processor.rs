//! Normalizer implementations.

use crate::{CwebpEncoder, Encoder, NormalizeConfig, probe};
use bytes::Bytes;
use curator_core::{NormalizeMode, PreparedImage};
use curator_error::{NormalizeError, NormalizeErrorKind};
use std::sync::Arc;

/// Turns raw image bytes into a [`PreparedImage`].
#[async_trait::async_trait]
pub trait ImageProcessor: Send + Sync {
    /// Canonicalize `raw` and compute its fingerprint.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput`, `UnsupportedFormat`, `Decode`,
    /// `InvalidDimensions` or `EncodeFailed`.
    async fn prepare(&self, raw: &[u8]) -> Result<PreparedImage, NormalizeError>;
}

/// Hybrid normalizer: WebP passes through, everything else is re-encoded.
///
/// # Examples
///
/// ```no_run
/// use curator_normalize::{ImageProcessor, NormalizeConfig, WebpNormalizer};
///
/// # async fn example(raw: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
/// let normalizer = WebpNormalizer::from_config(&NormalizeConfig::default());
/// let prepared = normalizer.prepare(&raw).await?;
/// println!("{} {}x{}", prepared.sha256(), prepared.width(), prepared.height());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WebpNormalizer {
    encoder: Arc<dyn Encoder>,
    pass_through_webp: bool,
}

impl std::fmt::Debug for WebpNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebpNormalizer")
            .field("encoder", &self.encoder.name())
            .field("pass_through_webp", &self.pass_through_webp)
            .finish()
    }
}

impl WebpNormalizer {
    /// Create a normalizer around an encoder, passing WebP through.
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            pass_through_webp: true,
        }
    }

    /// Create a `cwebp`-backed normalizer from configuration.
    pub fn from_config(config: &NormalizeConfig) -> Self {
        Self::new(Arc::new(CwebpEncoder::new(config)))
            .with_pass_through(*config.pass_through_webp())
    }

    /// Enable or disable WebP pass-through.
    pub fn with_pass_through(mut self, enabled: bool) -> Self {
        self.pass_through_webp = enabled;
        self
    }
}

#[async_trait::async_trait]
impl ImageProcessor for WebpNormalizer {
    #[tracing::instrument(skip(self, raw), fields(input_bytes = raw.len(), encoder = self.encoder.name()))]
    async fn prepare(&self, raw: &[u8]) -> Result<PreparedImage, NormalizeError> {
        let source = probe(raw)?;
        let original_mime = source.mime();

        if self.pass_through_webp && source.is_webp() {
            tracing::debug!(
                width = source.width,
                height = source.height,
                "WebP input passed through"
            );
            return Ok(PreparedImage::new(
                Bytes::copy_from_slice(raw),
                source.width,
                source.height,
                original_mime,
                NormalizeMode::PassThrough,
            ));
        }

        let owned = raw.to_vec();
        let format = source.format;
        let decoded = tokio::task::spawn_blocking(move || {
            image::load_from_memory_with_format(&owned, format)
        })
        .await
        .map_err(|e| NormalizeError::new(NormalizeErrorKind::Decode(e.to_string())))?
        .map_err(|e| NormalizeError::new(NormalizeErrorKind::Decode(e.to_string())))?;

        let encoded = self.encoder.encode(decoded).await?;

        // Encoders may resize; trust only the bytes that will be stored.
        let output = probe(&encoded).map_err(|e| {
            NormalizeError::new(NormalizeErrorKind::EncodeFailed(format!(
                "encoder output unreadable: {}",
                e.kind
            )))
        })?;

        tracing::debug!(
            original_mime,
            input_bytes = raw.len(),
            output_bytes = encoded.len(),
            width = output.width,
            height = output.height,
            "Image transcoded to WebP"
        );

        Ok(PreparedImage::new(
            Bytes::from(encoded),
            output.width,
            output.height,
            original_mime,
            NormalizeMode::Transcoded,
        ))
    }
}

/// Accepts WebP input only and never re-encodes.
///
/// For deployments without an encoder or for debugging pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictWebpProcessor;

#[async_trait::async_trait]
impl ImageProcessor for StrictWebpProcessor {
    async fn prepare(&self, raw: &[u8]) -> Result<PreparedImage, NormalizeError> {
        let source = probe(raw)?;
        if !source.is_webp() {
            return Err(NormalizeError::new(NormalizeErrorKind::UnsupportedFormat(
                format!("non-webp input is not supported; got {}", source.mime()),
            )));
        }
        Ok(PreparedImage::new(
            Bytes::copy_from_slice(raw),
            source.width,
            source.height,
            source.mime(),
            NormalizeMode::PassThrough,
        ))
    }
}
