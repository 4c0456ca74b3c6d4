//! End-to-end tests through configuration-built stores.

use curator::{
    BlobBackend, BlobConfig, CuratorConfig, DatabaseBackend, DatabaseConfig, ErrorCategory,
    Gallery, IngestConfig, LosslessWebpEncoder, Orientation, SkipReason, StoreInput,
};
use image::{DynamicImage, ImageBuffer, Rgb};
use tempfile::TempDir;

fn webp(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let raster = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([seed, (x * 7) as u8, (y * 11) as u8])
    });
    LosslessWebpEncoder::encode_blocking(&DynamicImage::ImageRgb8(raster)).unwrap()
}

fn memory_config() -> CuratorConfig {
    CuratorConfig::default()
        .with_database(DatabaseConfig::default().with_backend(DatabaseBackend::Memory))
        .with_blob(BlobConfig::default().with_backend(BlobBackend::Memory))
}

#[tokio::test]
async fn test_ingest_through_configured_gallery() {
    let config = memory_config().with_ingest(IngestConfig::default().with_key_prefix("gallery"));
    let gallery = Gallery::open(&config).await.unwrap();

    let outcome = gallery
        .service()
        .store_to_gallery(StoreInput::new("manual:1", webp(40, 30, 1)).with_source("manual"))
        .await
        .unwrap();

    let image = outcome.image().unwrap();
    assert_eq!(image.orientation, Orientation::Horizontal);
    assert_eq!(image.seq, 1);
    assert_eq!(image.blob_key, "gallery/h/1.webp");
    assert!(gallery.blobs().exists("gallery/h/1.webp").await.unwrap());
    assert_eq!(
        outcome.summary("manual"),
        "manual: stored h/1 (counts h=1 v=0)"
    );

    let again = gallery
        .service()
        .store_to_gallery(StoreInput::new("manual:2", webp(40, 30, 1)))
        .await
        .unwrap();
    assert_eq!(again.reason(), Some(SkipReason::DuplicateHash));
}

#[tokio::test]
async fn test_blocklist_is_shared_with_the_service() {
    let gallery = Gallery::open(&memory_config()).await.unwrap();
    assert!(gallery.metadata().block_source("manual:bad", Some("nsfw")).await.unwrap());

    let outcome = gallery
        .service()
        .store_to_gallery(StoreInput::new("manual:bad", vec![0u8; 16]))
        .await
        .unwrap();
    assert_eq!(outcome.reason(), Some(SkipReason::BlockedSource));
}

#[tokio::test]
async fn test_publish_through_configured_gallery() {
    let gallery = Gallery::open(&memory_config()).await.unwrap();
    gallery
        .blobs()
        .put(
            "random.js",
            b"var counts = {h:0,v:0};\nshow(counts);".to_vec().into(),
            "application/javascript",
        )
        .await
        .unwrap();

    for (i, (w, h)) in [(30, 40), (30, 40), (40, 30)].into_iter().enumerate() {
        let key = format!("manual:{}", i);
        gallery
            .service()
            .store_to_gallery(StoreInput::new(key, webp(w, h, i as u8)))
            .await
            .unwrap();
    }

    let summary = gallery.publisher().publish().await.unwrap();
    assert_eq!((summary.counts.h, summary.counts.v), (1, 2));

    let counts = gallery.blobs().get("counts.json").await.unwrap();
    assert_eq!(counts.data.as_ref(), br#"{"h":1,"v":2}"#);
    let script = gallery.blobs().get("random.js").await.unwrap();
    assert_eq!(
        std::str::from_utf8(&script.data).unwrap(),
        "var counts = {\"h\":1,\"v\":2};\nshow(counts);"
    );
}

#[tokio::test]
async fn test_filesystem_blobs_land_under_root() {
    let temp_dir = TempDir::new().unwrap();
    let config = memory_config().with_blob(BlobConfig::default().with_root(temp_dir.path()));
    let gallery = Gallery::open(&config).await.unwrap();

    gallery
        .service()
        .store_to_gallery(StoreInput::new("manual:v", webp(20, 50, 9)))
        .await
        .unwrap();
    assert!(temp_dir.path().join("objects/ri/v/1.webp").exists());
}

#[tokio::test]
async fn test_s3_without_bucket_fails_to_open() {
    let config = memory_config().with_blob(BlobConfig::default().with_backend(BlobBackend::S3));
    let err = Gallery::open(&config).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}
