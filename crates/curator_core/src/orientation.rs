//! Coarse aspect classification used to partition sequence numbering.

use serde::{Deserialize, Serialize};

/// Image orientation.
///
/// # Examples
///
/// ```
/// use curator_core::Orientation;
///
/// assert_eq!(Orientation::from_dimensions(600, 800), Orientation::Vertical);
/// // Square images are horizontal
/// assert_eq!(Orientation::from_dimensions(512, 512), Orientation::Horizontal);
/// assert_eq!(Orientation::Vertical.to_string(), "v");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum Orientation {
    /// Width greater than or equal to height
    #[serde(rename = "h")]
    #[display("h")]
    Horizontal,
    /// Height strictly greater than width
    #[serde(rename = "v")]
    #[display("v")]
    Vertical,
}

impl Orientation {
    /// Classify from pixel dimensions; ties go to horizontal.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "h",
            Orientation::Vertical => "v",
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Orientation::Horizontal),
            "v" | "vertical" => Ok(Orientation::Vertical),
            other => Err(format!("Unknown orientation: {}", other)),
        }
    }
}
