//! Canonical WebP normalization for the Curator gallery ingestion pipeline.
//!
//! The normalizer turns raw bytes in any supported raster format into a
//! [`PreparedImage`](curator_core::PreparedImage): canonical WebP bytes, their
//! SHA-256 fingerprint, dimensions and orientation.
//!
//! # Pipeline
//!
//! 1. Sniff the container format and read dimensions from the header
//! 2. WebP input passes through unchanged (configurable)
//! 3. Anything else is fully decoded and handed to an [`Encoder`]
//! 4. Dimensions and orientation are re-read from the encoder output
//! 5. The fingerprint is computed over the final bytes
//!
//! The default encoder shells out to `cwebp` through a per-call scratch
//! directory; [`LosslessWebpEncoder`] is an in-process alternative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cwebp;
mod encoder;
mod lossless;
mod probe;
mod processor;

pub use config::NormalizeConfig;
pub use cwebp::CwebpEncoder;
pub use encoder::Encoder;
pub use lossless::LosslessWebpEncoder;
pub use probe::{Probe, probe};
pub use processor::{ImageProcessor, StrictWebpProcessor, WebpNormalizer};
