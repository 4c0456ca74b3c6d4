//! Top-level error wrapper types.

use crate::{
    ConfigError, DatabaseError, DatabaseErrorKind, IngestError, IngestErrorKind, JsonError,
    NormalizeError, NormalizeErrorKind, StorageError, StorageErrorKind,
};

/// Every failure the pipeline can surface.
///
/// # Examples
///
/// ```
/// use curator_error::{CuratorError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::Backend("timeout".into()));
/// let err: CuratorError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CuratorErrorKind {
    /// Image normalization error
    #[from(NormalizeError)]
    Normalize(NormalizeError),
    /// Blob storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Metadata database error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Ingestion orchestration error
    #[from(IngestError)]
    Ingest(IngestError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Coarse failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ErrorCategory {
    /// Bad caller input: empty bytes, blank key, invalid record
    #[display("validation")]
    Validation,
    /// Corrupt or unsupported image, or encoder failure
    #[display("codec")]
    Codec,
    /// Metadata or blob store failure
    #[display("store_io")]
    StoreIo,
    /// Caller cancelled the operation
    #[display("cancelled")]
    Cancelled,
    /// Missing or invalid configuration
    #[display("configuration")]
    Configuration,
}

/// Curator error with kind discrimination.
///
/// # Examples
///
/// ```
/// use curator_error::{ConfigError, CuratorResult};
///
/// fn might_fail() -> CuratorResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Curator Error: {}", _0)]
pub struct CuratorError(Box<CuratorErrorKind>);

impl CuratorError {
    /// Create a new error from a kind.
    pub fn new(kind: CuratorErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CuratorErrorKind {
        &self.0
    }

    /// Classify the failure.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            CuratorErrorKind::Normalize(e) => match e.kind {
                NormalizeErrorKind::EmptyInput | NormalizeErrorKind::InvalidDimensions(..) => {
                    ErrorCategory::Validation
                }
                _ => ErrorCategory::Codec,
            },
            CuratorErrorKind::Storage(e) => match e.kind {
                StorageErrorKind::InvalidKey(_) => ErrorCategory::Validation,
                StorageErrorKind::InvalidConfig(_) => ErrorCategory::Configuration,
                _ => ErrorCategory::StoreIo,
            },
            CuratorErrorKind::Database(e) => match e.kind {
                DatabaseErrorKind::InvalidRecord(_) => ErrorCategory::Validation,
                DatabaseErrorKind::Migration(_) => ErrorCategory::Configuration,
                _ => ErrorCategory::StoreIo,
            },
            CuratorErrorKind::Ingest(e) => match e.kind {
                IngestErrorKind::MissingSourceKey | IngestErrorKind::EmptyInput => {
                    ErrorCategory::Validation
                }
                IngestErrorKind::Cancelled(_) => ErrorCategory::Cancelled,
                _ => ErrorCategory::StoreIo,
            },
            CuratorErrorKind::Config(_) => ErrorCategory::Configuration,
            CuratorErrorKind::Json(_) => ErrorCategory::Validation,
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Store I/O failures are transient unless a unique constraint rejected
    /// the write; every other category fails the same way again.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            CuratorErrorKind::Database(e) if e.is_unique_violation() => false,
            CuratorErrorKind::Ingest(IngestError {
                kind: IngestErrorKind::Insert { conflict: true, .. },
                ..
            }) => false,
            CuratorErrorKind::Storage(StorageError {
                kind: StorageErrorKind::NotFound(_),
                ..
            }) => false,
            _ => self.category() == ErrorCategory::StoreIo,
        }
    }

    /// Whether the caller's cancellation produced this error.
    pub fn is_cancelled(&self) -> bool {
        self.category() == ErrorCategory::Cancelled
    }
}

// Generic From implementation for any type that converts to CuratorErrorKind
impl<T> From<T> for CuratorError
where
    T: Into<CuratorErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Curator operations.
///
/// # Examples
///
/// ```
/// use curator_error::{CuratorResult, StorageError, StorageErrorKind};
///
/// fn fetch_blob() -> CuratorResult<Vec<u8>> {
///     Err(StorageError::new(StorageErrorKind::NotFound("ri/v/3.webp".into())))?
/// }
/// ```
pub type CuratorResult<T> = std::result::Result<T, CuratorError>;
