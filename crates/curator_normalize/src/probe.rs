//! Header-only format and dimension detection.

use curator_error::{NormalizeError, NormalizeErrorKind};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Container format and dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Detected container format
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Probe {
    /// MIME type of the detected format.
    pub fn mime(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Whether the input is already canonical.
    pub fn is_webp(&self) -> bool {
        self.format == ImageFormat::WebP
    }
}

/// Sniff the format of `data` and read its dimensions without decoding pixels.
///
/// # Errors
///
/// - `EmptyInput` for zero-length data
/// - `UnsupportedFormat` when no known signature matches
/// - `Decode` when the header is corrupt
/// - `InvalidDimensions` when either side is zero
pub fn probe(data: &[u8]) -> Result<Probe, NormalizeError> {
    if data.is_empty() {
        return Err(NormalizeError::new(NormalizeErrorKind::EmptyInput));
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| NormalizeError::new(NormalizeErrorKind::Decode(e.to_string())))?;
    let format = reader.format().ok_or_else(|| {
        NormalizeError::new(NormalizeErrorKind::UnsupportedFormat(
            "unrecognized image signature".to_string(),
        ))
    })?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| NormalizeError::new(NormalizeErrorKind::Decode(e.to_string())))?;

    if width == 0 || height == 0 {
        return Err(NormalizeError::new(NormalizeErrorKind::InvalidDimensions(
            width, height,
        )));
    }

    Ok(Probe {
        format,
        width,
        height,
    })
}
