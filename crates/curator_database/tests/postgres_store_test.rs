//! Postgres metadata store tests.
//!
//! These require a disposable PostgreSQL database named by `DATABASE_URL`;
//! run them with `cargo test -p curator_database -- --ignored`.

use curator_core::{GalleryImage, ImageStatus, Orientation};
use curator_database::{DatabaseConfig, MetadataStore, PostgresMetadataStore};
use curator_error::{CuratorErrorKind, DatabaseErrorKind};

fn unique(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn image(source_key: &str, sha256: &str, orientation: Orientation, seq: i64) -> GalleryImage {
    GalleryImage {
        id: source_key.to_string(),
        source: "test".to_string(),
        source_key: source_key.to_string(),
        source_url: Some("https://example.com/post/1".to_string()),
        source_post_id: Some("1".to_string()),
        sha256: sha256.to_string(),
        orientation,
        seq,
        blob_key: format!("test/{}/{}/{}.webp", sha256, orientation, seq),
        width: 640,
        height: 960,
        bytes: 2048,
        mime_type: "image/webp".to_string(),
        published_at: Some(1_700_000_000),
        collected_at: 1_700_000_100,
        status: ImageStatus::Active,
    }
}

async fn connect() -> PostgresMetadataStore {
    PostgresMetadataStore::connect(&DatabaseConfig::default())
        .await
        .expect("DATABASE_URL must point at a disposable database")
}

#[tokio::test]
#[ignore]
async fn insert_then_lookup() {
    let store = connect().await;
    let key = unique("pg-insert");
    let sha = unique("sha");
    let seq = store.next_sequence(Orientation::Vertical).await.unwrap();

    let stored = store
        .insert(image(&key, &sha, Orientation::Vertical, seq))
        .await
        .unwrap();
    assert!(store.exists_by_source_key(&key).await.unwrap());
    assert!(store.exists_by_fingerprint(&sha).await.unwrap());
    assert_eq!(store.get_by_source_key(&key).await.unwrap(), Some(stored));
    assert_eq!(
        store.next_sequence(Orientation::Vertical).await.unwrap(),
        seq + 1
    );
}

#[tokio::test]
#[ignore]
async fn duplicate_slot_is_a_unique_violation() {
    let store = connect().await;
    let seq = store.next_sequence(Orientation::Horizontal).await.unwrap();
    store
        .insert(image(&unique("pg-a"), &unique("sha-a"), Orientation::Horizontal, seq))
        .await
        .unwrap();

    let err = store
        .insert(image(&unique("pg-b"), &unique("sha-b"), Orientation::Horizontal, seq))
        .await
        .unwrap_err();
    match err.kind() {
        CuratorErrorKind::Database(e) => {
            assert!(matches!(e.kind, DatabaseErrorKind::UniqueViolation(_)))
        }
        other => panic!("expected database error, got {:?}", other),
    }
}

#[tokio::test]
#[ignore]
async fn blocklist_round_trip() {
    let store = connect().await;
    let key = unique("pg-block");

    assert!(store.block_source(&key, Some("spam")).await.unwrap());
    assert!(store.block_source(&key, Some("still spam")).await.unwrap());
    assert!(store.is_blocked(&key).await.unwrap());
    assert!(store.unblock_source(&key).await.unwrap());
    assert!(!store.is_blocked(&key).await.unwrap());
}
