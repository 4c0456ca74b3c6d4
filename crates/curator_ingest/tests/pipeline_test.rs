//! Ingestion through the real WebP normalizer.

use curator_core::{Orientation, SkipReason, StoreInput, fingerprint};
use curator_database::{InMemoryMetadataStore, MetadataStore};
use curator_ingest::GalleryService;
use curator_normalize::{LosslessWebpEncoder, WebpNormalizer};
use curator_storage::{BlobStore, MemoryBlobStore};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

fn encoded(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn service() -> (GalleryService, Arc<InMemoryMetadataStore>, Arc<MemoryBlobStore>) {
    let metadata = Arc::new(InMemoryMetadataStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let service = GalleryService::new(
        metadata.clone(),
        blobs.clone(),
        Arc::new(WebpNormalizer::new(Arc::new(LosslessWebpEncoder::new()))),
    );
    (service, metadata, blobs)
}

#[tokio::test]
async fn webp_input_is_stored_byte_for_byte() {
    let (service, _, blobs) = service();
    let webp = LosslessWebpEncoder::encode_blocking(&DynamicImage::ImageRgb8(
        RgbImage::from_pixel(30, 40, Rgb([10, 20, 30])),
    ))
    .unwrap();

    let outcome = service
        .store_to_gallery(StoreInput::new("tg:1:1", webp.clone()))
        .await
        .unwrap();

    let image = outcome.image().unwrap();
    assert_eq!(image.orientation, Orientation::Vertical);
    assert_eq!((image.width, image.height), (30, 40));
    assert_eq!(image.sha256, fingerprint(&webp));
    assert_eq!(blobs.get("ri/v/1.webp").await.unwrap().data.as_ref(), webp.as_slice());
}

#[tokio::test]
async fn same_pixels_in_different_containers_are_one_image() {
    let (service, metadata, blobs) = service();
    let png = encoded(64, 64, [200, 10, 10], ImageFormat::Png);
    let bmp = encoded(64, 64, [200, 10, 10], ImageFormat::Bmp);
    assert_ne!(png, bmp);

    let first = service
        .store_to_gallery(StoreInput::new("pixiv:1_p0", png))
        .await
        .unwrap();
    assert!(first.added());
    // Square images are horizontal
    assert_eq!(first.image().unwrap().blob_key, "ri/h/1.webp");

    let second = service
        .store_to_gallery(StoreInput::new("pixiv:2_p0", bmp))
        .await
        .unwrap();
    assert_eq!(second.reason(), Some(SkipReason::DuplicateHash));
    assert_eq!(second.fingerprint(), first.fingerprint());

    assert_eq!(metadata.len().await, 1);
    assert_eq!(blobs.len().await, 1);
}

#[tokio::test]
async fn different_pixels_are_distinct_images() {
    let (service, metadata, _) = service();
    for (key, color) in [("a", [0, 0, 0]), ("b", [0, 0, 1])] {
        let outcome = service
            .store_to_gallery(StoreInput::new(key, encoded(20, 10, color, ImageFormat::Png)))
            .await
            .unwrap();
        assert!(outcome.added());
    }
    assert_eq!(metadata.next_sequence(Orientation::Horizontal).await.unwrap(), 3);
}

#[tokio::test]
async fn outcome_serializes_for_notifications() {
    let (service, _, _) = service();
    let outcome = service
        .store_to_gallery(StoreInput::new(
            "tg:7:1",
            encoded(10, 20, [1, 2, 3], ImageFormat::Png),
        ))
        .await
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["added"], true);
    assert_eq!(json["image"]["blob_key"], "ri/v/1.webp");
    assert_eq!(json["image"]["orientation"], "v");
    assert_eq!(json["counts"]["v"], 1);
    assert_eq!(json["fingerprint"], json["image"]["sha256"]);
    assert_eq!(outcome.summary("tg"), "tg: stored v/1 (counts h=0 v=1)");
}
