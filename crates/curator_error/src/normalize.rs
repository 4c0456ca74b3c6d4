//! Image normalization error types.

/// Kinds of normalization errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NormalizeErrorKind {
    /// Zero-length input
    #[display("Empty image data")]
    EmptyInput,
    /// Container format not recognized or not accepted by this processor
    #[display("Unsupported image format: {}", _0)]
    UnsupportedFormat(String),
    /// Header or raster could not be decoded
    #[display("Failed to decode image: {}", _0)]
    Decode(String),
    /// Width or height is zero
    #[display("Invalid image dimensions {}x{}", _0, _1)]
    InvalidDimensions(u32, u32),
    /// External or in-process encoder failed
    #[display("Encoder failed: {}", _0)]
    EncodeFailed(String),
    /// Scratch directory could not be prepared or read
    #[display("Scratch directory error: {}", _0)]
    Scratch(String),
}

/// Normalization error with location tracking.
///
/// # Examples
///
/// ```
/// use curator_error::{NormalizeError, NormalizeErrorKind};
///
/// let err = NormalizeError::new(NormalizeErrorKind::EmptyInput);
/// assert!(format!("{}", err).contains("Empty image data"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Normalize Error: {} at line {} in {}", kind, line, file)]
pub struct NormalizeError {
    /// The kind of error that occurred
    pub kind: NormalizeErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NormalizeError {
    /// Create a new normalization error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NormalizeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
