//! Errors raised while loading or validating curator settings.

/// A setting that is missing, malformed, or inconsistent with another.
///
/// Always classified as a configuration failure, never retried.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What is wrong, naming the dotted setting where there is one
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// A required setting with no value, plus where else it may come from.
    ///
    /// ```
    /// use curator_error::ConfigError;
    ///
    /// let err = ConfigError::missing("database.url", Some("DATABASE_URL"));
    /// assert_eq!(err.message, "database.url is not set (nor DATABASE_URL)");
    /// ```
    #[track_caller]
    pub fn missing(setting: &str, fallback: Option<&str>) -> Self {
        match fallback {
            Some(fallback) => Self::new(format!("{} is not set (nor {})", setting, fallback)),
            None => Self::new(format!("{} is not set", setting)),
        }
    }
}
