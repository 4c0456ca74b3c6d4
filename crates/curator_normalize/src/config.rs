//! Normalizer configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Encoder quality bounds accepted by `cwebp -q`.
const QUALITY_RANGE: (i32, i32) = (0, 100);
/// Compression effort bounds accepted by `cwebp -m`.
const METHOD_RANGE: (i32, i32) = (0, 6);

/// Configuration for image normalization.
///
/// Out-of-range quality and method values are clamped when read through
/// [`effective_quality`](Self::effective_quality) and
/// [`effective_method`](Self::effective_method).
///
/// # Examples
///
/// ```
/// use curator_normalize::NormalizeConfig;
///
/// let config = NormalizeConfig::default().with_quality(140).with_method(-2);
/// assert_eq!(config.effective_quality(), 100);
/// assert_eq!(config.effective_method(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct NormalizeConfig {
    /// Path or name of the `cwebp` executable
    #[serde(default = "default_cwebp_binary")]
    #[setters(into)]
    cwebp_binary: String,

    /// Lossy quality, 0-100
    #[serde(default = "default_quality")]
    quality: i32,

    /// Compression effort, 0-6
    #[serde(default = "default_method")]
    method: i32,

    /// Store WebP input unchanged instead of re-encoding it
    #[serde(default = "default_pass_through_webp")]
    pass_through_webp: bool,

    /// Parent directory for per-call scratch directories (system temp if unset)
    #[serde(default)]
    #[setters(strip_option, into)]
    scratch_root: Option<PathBuf>,
}

fn default_cwebp_binary() -> String {
    "cwebp".to_string()
}

fn default_quality() -> i32 {
    84
}

fn default_method() -> i32 {
    4
}

fn default_pass_through_webp() -> bool {
    true
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            cwebp_binary: default_cwebp_binary(),
            quality: default_quality(),
            method: default_method(),
            pass_through_webp: default_pass_through_webp(),
            scratch_root: None,
        }
    }
}

impl NormalizeConfig {
    /// Quality clamped to 0-100.
    pub fn effective_quality(&self) -> u8 {
        self.quality.clamp(QUALITY_RANGE.0, QUALITY_RANGE.1) as u8
    }

    /// Method clamped to 0-6.
    pub fn effective_method(&self) -> u8 {
        self.method.clamp(METHOD_RANGE.0, METHOD_RANGE.1) as u8
    }

    /// Encoder binary, falling back to `cwebp` when blank.
    pub fn effective_binary(&self) -> &str {
        match self.cwebp_binary.trim() {
            "" => "cwebp",
            binary => binary,
        }
    }
}
