//! Behavior of the in-memory metadata store.

use curator_core::{GalleryImage, ImageStatus, Orientation};
use curator_database::{
    DatabaseBackend, DatabaseConfig, InMemoryMetadataStore, MetadataStore, open_metadata_store,
};
use curator_error::{CuratorError, CuratorErrorKind, DatabaseErrorKind, ErrorCategory};

fn image(source_key: &str, sha256: &str, orientation: Orientation, seq: i64) -> GalleryImage {
    GalleryImage {
        id: source_key.to_string(),
        source: "telegram".to_string(),
        source_key: source_key.to_string(),
        source_url: None,
        source_post_id: None,
        sha256: sha256.to_string(),
        orientation,
        seq,
        blob_key: format!("ri/{}/{}.webp", orientation, seq),
        width: 800,
        height: 600,
        bytes: 1024,
        mime_type: "image/webp".to_string(),
        published_at: None,
        collected_at: 1_700_000_000,
        status: ImageStatus::Active,
    }
}

fn database_kind(err: &CuratorError) -> &DatabaseErrorKind {
    match err.kind() {
        CuratorErrorKind::Database(e) => &e.kind,
        other => panic!("expected database error, got {:?}", other),
    }
}

#[tokio::test]
async fn next_sequence_starts_at_one_per_orientation() {
    let store = InMemoryMetadataStore::new();
    assert_eq!(store.next_sequence(Orientation::Horizontal).await.unwrap(), 1);
    assert_eq!(store.next_sequence(Orientation::Vertical).await.unwrap(), 1);

    store
        .insert(image("a", "aa", Orientation::Horizontal, 1))
        .await
        .unwrap();
    store
        .insert(image("b", "bb", Orientation::Horizontal, 7))
        .await
        .unwrap();

    assert_eq!(store.next_sequence(Orientation::Horizontal).await.unwrap(), 8);
    assert_eq!(store.next_sequence(Orientation::Vertical).await.unwrap(), 1);
}

#[tokio::test]
async fn existence_checks_ignore_status() {
    let store = InMemoryMetadataStore::new();
    let mut hidden = image("tg:1:1", "ABC123", Orientation::Vertical, 1);
    hidden.status = ImageStatus::Hidden;
    store.insert(hidden).await.unwrap();

    assert!(store.exists_by_source_key(" tg:1:1 ").await.unwrap());
    assert!(store.exists_by_fingerprint("abc123").await.unwrap());
    assert!(!store.exists_by_source_key("tg:1:2").await.unwrap());
    assert!(!store.exists_by_fingerprint("def456").await.unwrap());
}

#[tokio::test]
async fn insert_enforces_every_unique_field() {
    let store = InMemoryMetadataStore::new();
    store
        .insert(image("a", "aa", Orientation::Horizontal, 1))
        .await
        .unwrap();

    let same_source = image("a", "zz", Orientation::Horizontal, 2);
    let mut same_hash = image("b", "aa", Orientation::Horizontal, 3);
    same_hash.id = "b".into();
    let same_slot = image("c", "cc", Orientation::Horizontal, 1);
    let mut same_blob = image("d", "dd", Orientation::Vertical, 4);
    same_blob.blob_key = "ri/h/1.webp".into();

    for candidate in [same_source, same_hash, same_slot, same_blob] {
        let key = candidate.source_key.clone();
        let err = store.insert(candidate).await.unwrap_err();
        assert!(
            matches!(database_kind(&err), DatabaseErrorKind::UniqueViolation(_)),
            "{} should conflict",
            key
        );
        assert!(!err.is_retryable());
    }
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn same_seq_in_other_orientation_is_allowed() {
    let store = InMemoryMetadataStore::new();
    store
        .insert(image("a", "aa", Orientation::Horizontal, 1))
        .await
        .unwrap();
    store
        .insert(image("b", "bb", Orientation::Vertical, 1))
        .await
        .unwrap();
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn insert_normalizes_record() {
    let store = InMemoryMetadataStore::new();
    let mut record = image("  pixiv:9_p0 ", " DEADBEEF ", Orientation::Vertical, 1);
    record.id = " ".into();
    record.mime_type = String::new();
    record.collected_at = 0;

    let stored = store.insert(record).await.unwrap();
    assert_eq!(stored.id, "pixiv:9_p0");
    assert_eq!(stored.source_key, "pixiv:9_p0");
    assert_eq!(stored.sha256, "deadbeef");
    assert_eq!(stored.mime_type, "image/webp");
    assert!(stored.collected_at > 0);

    let fetched = store.get_by_source_key("pixiv:9_p0").await.unwrap();
    assert_eq!(fetched, Some(stored));
}

#[tokio::test]
async fn invalid_records_never_reach_storage() {
    let store = InMemoryMetadataStore::new();

    let mut no_key = image("a", "aa", Orientation::Horizontal, 1);
    no_key.source_key = "  ".into();
    let zero_seq = image("b", "bb", Orientation::Horizontal, 0);
    let mut no_blob = image("c", "cc", Orientation::Horizontal, 1);
    no_blob.blob_key = String::new();
    let mut no_height = image("d", "dd", Orientation::Horizontal, 1);
    no_height.height = 0;

    for candidate in [no_key, zero_seq, no_blob, no_height] {
        let err = store.insert(candidate).await.unwrap_err();
        assert!(matches!(
            database_kind(&err),
            DatabaseErrorKind::InvalidRecord(_)
        ));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn counts_only_active_records() {
    let store = InMemoryMetadataStore::new();
    store
        .insert(image("a", "aa", Orientation::Horizontal, 1))
        .await
        .unwrap();
    store
        .insert(image("b", "bb", Orientation::Horizontal, 2))
        .await
        .unwrap();
    store
        .insert(image("c", "cc", Orientation::Vertical, 1))
        .await
        .unwrap();
    assert!(store.set_status("b", ImageStatus::Removed).await);

    let counts = store.count_active_by_orientation().await.unwrap();
    assert_eq!((counts.h, counts.v), (1, 1));

    // Removed records still hold their slot
    assert_eq!(store.next_sequence(Orientation::Horizontal).await.unwrap(), 3);
}

#[tokio::test]
async fn blocklist_round_trip() {
    let store = InMemoryMetadataStore::new();

    assert!(!store.block_source("   ", Some("spam")).await.unwrap());
    assert!(!store.is_blocked("").await.unwrap());

    assert!(store.block_source(" tg:5:1 ", Some("spam")).await.unwrap());
    assert!(store.block_source("tg:5:1", None).await.unwrap());
    assert!(store.is_blocked("tg:5:1").await.unwrap());

    assert!(store.unblock_source("tg:5:1").await.unwrap());
    assert!(!store.unblock_source("tg:5:1").await.unwrap());
    assert!(!store.is_blocked("tg:5:1").await.unwrap());
}

#[tokio::test]
async fn open_metadata_store_selects_memory_backend() {
    let config = DatabaseConfig::default().with_backend(DatabaseBackend::Memory);
    let store = open_metadata_store(&config).await.unwrap();
    assert_eq!(store.backend(), "memory");
}

#[test]
fn debug_output_redacts_url() {
    let config = DatabaseConfig::default().with_url("postgres://curator:hunter2@db/curator");
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("hunter2"));
}
