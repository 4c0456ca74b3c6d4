//! Out-of-process WebP encoding through the `cwebp` tool.

use crate::{Encoder, NormalizeConfig};
use curator_error::{NormalizeError, NormalizeErrorKind};
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::process::Command;

const INPUT_NAME: &str = "input.png";
const OUTPUT_NAME: &str = "output.webp";

/// Encodes by writing a PNG into a fresh scratch directory and running
/// `cwebp -quiet -mt -q <quality> -m <method> input.png -o output.webp`.
///
/// The scratch directory is removed on every exit path, and the child is
/// killed if the encode future is dropped.
#[derive(Debug, Clone)]
pub struct CwebpEncoder {
    binary: String,
    quality: u8,
    method: u8,
    scratch_root: Option<PathBuf>,
}

impl CwebpEncoder {
    /// Create an encoder from configuration, clamping quality and method.
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            binary: config.effective_binary().to_string(),
            quality: config.effective_quality(),
            method: config.effective_method(),
            scratch_root: config.scratch_root().clone(),
        }
    }

    /// Command-line arguments for one conversion.
    pub fn args(&self, input: &std::path::Path, output: &std::path::Path) -> Vec<String> {
        vec![
            "-quiet".to_string(),
            "-mt".to_string(),
            "-q".to_string(),
            self.quality.to_string(),
            "-m".to_string(),
            self.method.to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ]
    }

    fn scratch_dir(&self) -> Result<TempDir, NormalizeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("curator-webp-");
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| NormalizeError::new(NormalizeErrorKind::Scratch(e.to_string())))
    }
}

impl Default for CwebpEncoder {
    fn default() -> Self {
        Self::new(&NormalizeConfig::default())
    }
}

#[async_trait::async_trait]
impl Encoder for CwebpEncoder {
    fn name(&self) -> &'static str {
        "cwebp"
    }

    #[tracing::instrument(skip(self, image), fields(binary = %self.binary, quality = self.quality, method = self.method))]
    async fn encode(&self, image: DynamicImage) -> Result<Vec<u8>, NormalizeError> {
        let scratch = self.scratch_dir()?;
        let input = scratch.path().join(INPUT_NAME);
        let output = scratch.path().join(OUTPUT_NAME);

        // The blocking task owns the scratch dir while it writes, so the
        // directory is still removed if this future is dropped mid-write.
        let png_path = input.clone();
        let scratch = tokio::task::spawn_blocking(move || {
            // PNG has no float sample layout
            let image = match image {
                DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                    DynamicImage::ImageRgba8(image.to_rgba8())
                }
                other => other,
            };
            image
                .save_with_format(&png_path, ImageFormat::Png)
                .map(|_| scratch)
                .map_err(|e| {
                    NormalizeError::new(NormalizeErrorKind::Scratch(format!(
                        "write temp png: {}",
                        e
                    )))
                })
        })
        .await
        .map_err(|e| NormalizeError::new(NormalizeErrorKind::Scratch(e.to_string())))??;

        let result = Command::new(&self.binary)
            .args(self.args(&input, &output))
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                NormalizeError::new(NormalizeErrorKind::EncodeFailed(format!(
                    "cwebp failed: {}",
                    e
                )))
            })?;

        if !result.status.success() {
            let mut diagnostic = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&result.stdout);
            if !stdout.trim().is_empty() {
                if !diagnostic.is_empty() {
                    diagnostic.push('\n');
                }
                diagnostic.push_str(stdout.trim());
            }
            if diagnostic.is_empty() {
                diagnostic = result.status.to_string();
            }
            tracing::warn!(status = %result.status, diagnostic = %diagnostic, "cwebp exited with failure");
            return Err(NormalizeError::new(NormalizeErrorKind::EncodeFailed(
                format!("cwebp failed: {}", diagnostic),
            )));
        }

        let data = tokio::fs::read(&output).await.map_err(|e| {
            NormalizeError::new(NormalizeErrorKind::EncodeFailed(format!(
                "read webp output: {}",
                e
            )))
        })?;
        if data.is_empty() {
            return Err(NormalizeError::new(NormalizeErrorKind::EncodeFailed(
                "cwebp produced empty output".to_string(),
            )));
        }

        tracing::debug!(bytes = data.len(), "cwebp encode complete");
        drop(scratch);
        Ok(data)
    }
}
