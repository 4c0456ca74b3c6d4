//! In-process lossless WebP encoding.

use crate::Encoder;
use curator_error::{NormalizeError, NormalizeErrorKind};
use image::{DynamicImage, ExtendedColorType, codecs::webp::WebPEncoder};

/// Pure-Rust lossless WebP encoder.
///
/// Output is deterministic for a given raster, which makes it usable where
/// `cwebp` is not installed and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LosslessWebpEncoder;

impl LosslessWebpEncoder {
    /// Create a lossless encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode synchronously.
    pub fn encode_blocking(image: &DynamicImage) -> Result<Vec<u8>, NormalizeError> {
        let rgba = image.to_rgba8();
        let mut out = Vec::new();
        WebPEncoder::new_lossless(&mut out)
            .encode(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| NormalizeError::new(NormalizeErrorKind::EncodeFailed(e.to_string())))?;
        Ok(out)
    }
}

#[async_trait::async_trait]
impl Encoder for LosslessWebpEncoder {
    fn name(&self) -> &'static str {
        "lossless-webp"
    }

    async fn encode(&self, image: DynamicImage) -> Result<Vec<u8>, NormalizeError> {
        tokio::task::spawn_blocking(move || Self::encode_blocking(&image))
            .await
            .map_err(|e| NormalizeError::new(NormalizeErrorKind::EncodeFailed(e.to_string())))?
    }
}
