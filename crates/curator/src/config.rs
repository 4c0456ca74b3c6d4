//! Layered configuration for the curator binary.

use config::{Config, Environment, File};
use curator_database::DatabaseConfig;
use curator_error::{ConfigError, CuratorError, CuratorResult};
use curator_ingest::IngestConfig;
use curator_normalize::NormalizeConfig;
use curator_storage::BlobConfig;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Prefix for environment overrides, e.g. `CURATOR__DATABASE__URL`.
pub const ENV_PREFIX: &str = "CURATOR";

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    #[setters(into)]
    level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Complete curator configuration.
///
/// Every section is optional in the sources; missing values take their
/// defaults.
///
/// # Examples
///
/// ```
/// use curator::{CuratorConfig, DatabaseBackend};
///
/// let config = CuratorConfig::default();
/// assert_eq!(*config.database().backend(), DatabaseBackend::Postgres);
/// assert_eq!(config.ingest().key_prefix(), "ri");
/// assert_eq!(config.logging().level(), "info");
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct CuratorConfig {
    /// Metadata store
    #[serde(default)]
    database: DatabaseConfig,

    /// Blob store
    #[serde(default)]
    blob: BlobConfig,

    /// Image normalization
    #[serde(default)]
    normalize: NormalizeConfig,

    /// Ingestion pipeline
    #[serde(default)]
    ingest: IngestConfig,

    /// Log output
    #[serde(default)]
    logging: LoggingConfig,
}

impl CuratorConfig {
    /// Load configuration from a single file, without any other source.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> CuratorResult<Self> {
        debug!("Loading configuration from file");
        let source = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                config_error(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
        deserialize(source)
    }

    /// Load configuration with precedence, lowest first:
    ///
    /// 1. Built-in defaults
    /// 2. `~/.config/curator/curator.toml`
    /// 3. `./curator.toml`
    /// 4. `explicit`, which must exist when given
    /// 5. `CURATOR__SECTION__KEY` environment variables
    ///
    /// A `.env` file in the working directory is read first.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use curator::CuratorConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = CuratorConfig::load(None)?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a present source cannot be parsed or the
    /// explicit file is missing.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> CuratorResult<Self> {
        let _ = dotenvy::dotenv();

        let mut optional = Vec::new();
        if let Some(home) = dirs::home_dir() {
            optional.push(home.join(".config/curator/curator.toml"));
        }
        optional.push(PathBuf::from("curator.toml"));

        Self::load_layered(&optional, explicit, Self::environment())
    }

    /// Environment source used by [`load`](Self::load).
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// Merge `optional` files (skipped when absent), then `explicit`, then
    /// `environment`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a present source cannot be parsed or the
    /// explicit file is missing.
    pub fn load_layered(
        optional: &[PathBuf],
        explicit: Option<&Path>,
        environment: Environment,
    ) -> CuratorResult<Self> {
        let mut builder = Config::builder();
        for path in optional {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Adding explicit configuration file");
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(environment);

        let source = builder.build().map_err(|e| {
            config_error(format!("Failed to build configuration: {}", e))
        })?;
        deserialize(source)
    }
}

fn deserialize(source: Config) -> CuratorResult<CuratorConfig> {
    source
        .try_deserialize()
        .map_err(|e| config_error(format!("Failed to parse configuration: {}", e)))
}

#[track_caller]
fn config_error(message: String) -> CuratorError {
    CuratorError::from(ConfigError::new(message))
}
