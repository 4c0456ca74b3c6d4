//! Metadata store configuration and backend selection.

use crate::{InMemoryMetadataStore, MetadataStore, PostgresMetadataStore};
use curator_error::{ConfigError, CuratorResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which metadata backend to use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    /// PostgreSQL through a pooled diesel connection
    #[default]
    #[display("postgres")]
    Postgres,
    /// Process memory, lost on exit
    #[display("memory")]
    Memory,
}

/// Metadata store configuration.
///
/// # Examples
///
/// ```
/// use curator_database::DatabaseConfig;
///
/// let config = DatabaseConfig::default().with_url("postgres://localhost/curator");
/// assert_eq!(*config.pool_size(), 4);
/// assert!(*config.run_migrations());
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct DatabaseConfig {
    /// Backend selection
    #[serde(default)]
    backend: DatabaseBackend,

    /// Postgres connection URL; `DATABASE_URL` is used when unset
    #[serde(default)]
    #[setters(strip_option, into)]
    url: Option<String>,

    /// Maximum pooled connections
    #[serde(default = "default_pool_size")]
    pool_size: u32,

    /// Apply pending migrations when connecting
    #[serde(default = "default_run_migrations")]
    run_migrations: bool,
}

fn default_pool_size() -> u32 {
    4
}

fn default_run_migrations() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: None,
            pool_size: default_pool_size(),
            run_migrations: default_run_migrations(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("pool_size", &self.pool_size)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection URL from the config, falling back to `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when neither is set.
    pub fn resolved_url(&self) -> Result<String, ConfigError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .ok_or_else(|| ConfigError::missing("database.url", Some("DATABASE_URL")))
    }
}

/// Build the configured metadata store.
///
/// # Errors
///
/// Returns a `ConfigError` when the Postgres backend has no URL, or any
/// error from connecting and migrating.
#[tracing::instrument(skip(config), fields(backend = %config.backend))]
pub async fn open_metadata_store(config: &DatabaseConfig) -> CuratorResult<Arc<dyn MetadataStore>> {
    let store: Arc<dyn MetadataStore> = match config.backend {
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; records are lost on exit");
            Arc::new(InMemoryMetadataStore::new())
        }
        DatabaseBackend::Postgres => Arc::new(PostgresMetadataStore::connect(config).await?),
    };
    Ok(store)
}
