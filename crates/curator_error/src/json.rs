//! Encoding failures for counts documents and command output.

/// A value could not be rendered as JSON.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// Which document failed, and the encoder's message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Failure encoding the named document.
    ///
    /// ```
    /// use curator_error::JsonError;
    ///
    /// let err = JsonError::encoding("counts.json", "key must be a string");
    /// assert_eq!(err.message, "encoding counts.json: key must be a string");
    /// ```
    #[track_caller]
    pub fn encoding(document: &str, cause: impl std::fmt::Display) -> Self {
        Self::new(format!("encoding {}: {}", document, cause))
    }
}
