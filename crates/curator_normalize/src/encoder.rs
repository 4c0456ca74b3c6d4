//! Encoder capability.

use curator_error::NormalizeError;
use image::DynamicImage;

/// Re-encodes a decoded raster into canonical WebP bytes.
///
/// Implementations must be cancel-safe: dropping the returned future must
/// release every resource the call acquired (child processes, scratch files).
#[async_trait::async_trait]
pub trait Encoder: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Encode `image` as WebP.
    ///
    /// # Errors
    ///
    /// Returns `EncodeFailed` when the encoder rejects the image or produces
    /// no output.
    async fn encode(&self, image: DynamicImage) -> Result<Vec<u8>, NormalizeError>;
}
