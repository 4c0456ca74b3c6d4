//! Caller-supplied ingestion request.

use bytes::Bytes;

/// One image submitted for ingestion.
///
/// # Examples
///
/// ```
/// use curator_core::StoreInput;
///
/// let input = StoreInput::new("tg:42:1", vec![0x52, 0x49, 0x46, 0x46])
///     .with_source("telegram")
///     .with_source_url("https://t.me/c/42/1")
///     .with_published_at(1_700_000_000i64);
///
/// assert_eq!(input.source_key, "tg:42:1");
/// assert_eq!(input.source_url.as_deref(), Some("https://t.me/c/42/1"));
/// ```
#[derive(Debug, Clone, Default, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct StoreInput {
    /// Preferred record id
    pub id: Option<String>,
    /// Origin tag; blank means `unknown`
    pub source: String,
    /// Unique key of the originating unit of content
    #[setters(skip)]
    pub source_key: String,
    /// Link back to the origin
    pub source_url: Option<String>,
    /// Post identifier at the origin
    pub source_post_id: Option<String>,
    /// Raw image bytes in any supported format
    #[setters(skip)]
    pub raw: Bytes,
    /// Publication time at the origin (epoch seconds)
    pub published_at: Option<i64>,
    /// Collection time (epoch seconds); now when absent
    pub collected_at: Option<i64>,
}

impl StoreInput {
    /// Create an input from its two mandatory fields.
    pub fn new(source_key: impl Into<String>, raw: impl Into<Bytes>) -> Self {
        Self {
            source_key: source_key.into(),
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// Trim every text field, drop blank optionals and default a blank source.
    pub fn normalized(mut self) -> Self {
        fn trimmed(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.id = trimmed(self.id);
        self.source = self.source.trim().to_string();
        if self.source.is_empty() {
            self.source = "unknown".to_string();
        }
        self.source_key = self.source_key.trim().to_string();
        self.source_url = trimmed(self.source_url);
        self.source_post_id = trimmed(self.source_post_id);
        self
    }
}
