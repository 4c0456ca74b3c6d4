//! Ingestion configuration.

use curator_core::DEFAULT_KEY_PREFIX;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ingestion pipeline settings.
///
/// # Examples
///
/// ```
/// use curator_ingest::IngestConfig;
/// use std::time::Duration;
///
/// let config = IngestConfig::default().with_compensation_timeout_secs(5u64);
/// assert_eq!(config.key_prefix(), "ri");
/// assert_eq!(config.compensation_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct IngestConfig {
    /// Namespace for gallery blob keys
    #[serde(default = "default_key_prefix")]
    #[setters(into)]
    key_prefix: String,

    /// Upper bound on the compensating blob delete after a failed insert
    #[serde(default = "default_compensation_timeout_secs")]
    compensation_timeout_secs: u64,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_compensation_timeout_secs() -> u64 {
    30
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            compensation_timeout_secs: default_compensation_timeout_secs(),
        }
    }
}

impl IngestConfig {
    /// Compensation timeout, at least one second.
    pub fn compensation_timeout(&self) -> Duration {
        Duration::from_secs(self.compensation_timeout_secs.max(1))
    }
}
