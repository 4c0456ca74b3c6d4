//! Ingestion orchestration error types.

/// Ingestion error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IngestErrorKind {
    /// `source_key` was blank
    #[display("source_key is required")]
    MissingSourceKey,
    /// Raw image bytes were empty
    #[display("raw image data is empty")]
    EmptyInput,
    /// Caller cancelled while the named step was in flight
    #[display("cancelled during {}", _0)]
    Cancelled(&'static str),
    /// A metadata or blob store call failed
    #[display("{} failed: {}", operation, message)]
    Store {
        /// Store operation that failed
        operation: &'static str,
        /// Underlying error text
        message: String,
    },
    /// Canonical bytes could not be uploaded
    #[display("upload blob {} failed: {}", key, message)]
    Upload {
        /// Derived blob key
        key: String,
        /// Underlying error text
        message: String,
    },
    /// The metadata row could not be inserted after a successful upload
    #[display("insert gallery image failed: {}", message)]
    Insert {
        /// Underlying error text
        message: String,
        /// A storage-layer unique constraint rejected the row
        conflict: bool,
    },
    /// The commit task did not run to completion
    #[display("commit task aborted: {}", _0)]
    Commit(String),
    /// Publishing gallery metadata objects failed
    #[display("publish {} failed: {}", object, message)]
    Publish {
        /// Object key being published
        object: String,
        /// Underlying error text
        message: String,
    },
}

/// Ingestion error with source location tracking.
///
/// # Examples
///
/// ```
/// use curator_error::{IngestError, IngestErrorKind};
///
/// let err = IngestError::new(IngestErrorKind::Cancelled("next_sequence"));
/// assert!(format!("{}", err).contains("cancelled during next_sequence"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ingest Error: {} at line {} in {}", kind, line, file)]
pub struct IngestError {
    /// The kind of error that occurred
    pub kind: IngestErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl IngestError {
    /// Create a new IngestError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IngestErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
