//! Tests for layered configuration loading.

use curator::{
    BlobBackend, CuratorConfig, DatabaseBackend, ErrorCategory, LoggingConfig,
    ObservabilityConfig,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn no_env() -> config::Environment {
    CuratorConfig::environment().source(Some(Default::default()))
}

fn env(vars: &[(&str, &str)]) -> config::Environment {
    CuratorConfig::environment().source(Some(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    ))
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_defaults_without_sources() {
    let config = CuratorConfig::load_layered(&[], None, no_env()).unwrap();
    assert_eq!(config, CuratorConfig::default());
    assert_eq!(*config.database().pool_size(), 4);
    assert_eq!(*config.blob().backend(), BlobBackend::Filesystem);
    assert_eq!(
        config.blob().cache_control(),
        "public, max-age=31536000, immutable"
    );
    assert_eq!(*config.normalize().quality(), 84);
    assert_eq!(*config.normalize().method(), 4);
    assert_eq!(*config.ingest().compensation_timeout_secs(), 30);
    assert!(!*config.logging().json());
}

#[test]
fn test_file_sections_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "curator.toml",
        r#"
[database]
backend = "memory"
pool_size = 9

[blob]
backend = "s3"
bucket = "gallery"
endpoint = "https://account.r2.cloudflarestorage.com"

[normalize]
quality = 70
pass_through_webp = false

[ingest]
key_prefix = "gallery"

[logging]
level = "warn"
json = true
"#,
    );

    let config = CuratorConfig::from_file(&path).unwrap();
    assert_eq!(*config.database().backend(), DatabaseBackend::Memory);
    assert_eq!(*config.database().pool_size(), 9);
    assert!(*config.database().run_migrations());
    assert_eq!(*config.blob().backend(), BlobBackend::S3);
    assert_eq!(config.blob().bucket().as_deref(), Some("gallery"));
    assert_eq!(config.blob().region(), "auto");
    assert_eq!(*config.normalize().quality(), 70);
    assert!(!*config.normalize().pass_through_webp());
    assert_eq!(config.normalize().cwebp_binary(), "cwebp");
    assert_eq!(config.ingest().key_prefix(), "gallery");
    assert_eq!(
        config.logging(),
        &LoggingConfig::default().with_level("warn").with_json(true)
    );
}

#[test]
fn test_later_files_win_and_missing_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let home = write(
        &dir,
        "home.toml",
        "[normalize]\nquality = 60\nmethod = 6\n",
    );
    let local = write(&dir, "local.toml", "[normalize]\nquality = 90\n");
    let missing = dir.path().join("missing.toml");

    let config =
        CuratorConfig::load_layered(&[home, missing, local], None, no_env()).unwrap();
    assert_eq!(*config.normalize().quality(), 90);
    assert_eq!(*config.normalize().method(), 6);
}

#[test]
fn test_explicit_file_overrides_optional_files() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "curator.toml", "[ingest]\nkey_prefix = \"local\"\n");
    let explicit = write(&dir, "prod.toml", "[ingest]\nkey_prefix = \"prod\"\n");

    let config =
        CuratorConfig::load_layered(&[local], Some(explicit.as_path()), no_env()).unwrap();
    assert_eq!(config.ingest().key_prefix(), "prod");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("nope.toml");

    let err = CuratorConfig::load_layered(&[], Some(explicit.as_path()), no_env()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(!err.is_retryable());
}

#[test]
fn test_environment_overrides_files() {
    let dir = TempDir::new().unwrap();
    let explicit = write(
        &dir,
        "curator.toml",
        "[database]\npool_size = 9\n\n[blob]\nbackend = \"filesystem\"\n",
    );

    let config = CuratorConfig::load_layered(
        &[],
        Some(explicit.as_path()),
        env(&[
            ("CURATOR__DATABASE__POOL_SIZE", "12"),
            ("CURATOR__BLOB__BACKEND", "memory"),
            ("CURATOR__LOGGING__JSON", "true"),
            ("UNRELATED__DATABASE__POOL_SIZE", "1"),
        ]),
    )
    .unwrap();

    assert_eq!(*config.database().pool_size(), 12);
    assert_eq!(*config.blob().backend(), BlobBackend::Memory);
    assert!(*config.logging().json());
}

#[test]
fn test_malformed_values_are_configuration_errors() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.toml", "[blob]\nbackend = \"floppy\"\n");

    let err = CuratorConfig::from_file(&path).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_debug_output_redacts_secrets() {
    let config = CuratorConfig::default()
        .with_database(
            curator::DatabaseConfig::default().with_url("postgres://curator:pw-secret@db/curator"),
        )
        .with_blob(curator::BlobConfig::default().with_secret_access_key("sk-secret"));

    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("pw-secret"));
    assert!(!rendered.contains("sk-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_observability_follows_logging_section() {
    let logging = LoggingConfig::default().with_level("debug").with_json(true);
    let observability = ObservabilityConfig::from_logging("curator", &logging);
    assert_eq!(observability.service_name, "curator");
    assert_eq!(observability.log_level, "debug");
    assert!(observability.json_logs);
    assert!(!observability.service_version.is_empty());
}
