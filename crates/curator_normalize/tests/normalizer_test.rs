use curator_core::{NormalizeMode, Orientation, fingerprint};
use curator_error::{NormalizeError, NormalizeErrorKind};
use curator_normalize::{
    Encoder, ImageProcessor, LosslessWebpEncoder, StrictWebpProcessor, WebpNormalizer, probe,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn raster(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn webp(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    LosslessWebpEncoder::encode_blocking(&raster(width, height, color)).unwrap()
}

/// Counts calls and delegates to the lossless encoder.
#[derive(Default)]
struct CountingEncoder {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Encoder for CountingEncoder {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn encode(&self, image: DynamicImage) -> Result<Vec<u8>, NormalizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        LosslessWebpEncoder::encode_blocking(&image)
    }
}

/// Rotates a quarter turn before encoding, swapping the dimensions.
struct RotatingEncoder;

#[async_trait::async_trait]
impl Encoder for RotatingEncoder {
    fn name(&self) -> &'static str {
        "rotating"
    }

    async fn encode(&self, image: DynamicImage) -> Result<Vec<u8>, NormalizeError> {
        LosslessWebpEncoder::encode_blocking(&image.rotate90())
    }
}

struct FailingEncoder;

#[async_trait::async_trait]
impl Encoder for FailingEncoder {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn encode(&self, _image: DynamicImage) -> Result<Vec<u8>, NormalizeError> {
        Err(NormalizeError::new(NormalizeErrorKind::EncodeFailed(
            "cwebp failed: unsupported color profile".to_string(),
        )))
    }
}

fn lossless_normalizer() -> WebpNormalizer {
    WebpNormalizer::new(Arc::new(LosslessWebpEncoder::new()))
}

#[tokio::test]
async fn empty_input_is_rejected() {
    let err = lossless_normalizer().prepare(&[]).await.unwrap_err();
    assert_eq!(err.kind, NormalizeErrorKind::EmptyInput);
}

#[tokio::test]
async fn unrecognized_bytes_are_unsupported() {
    let err = lossless_normalizer()
        .prepare(b"definitely not an image")
        .await
        .unwrap_err();
    assert!(matches!(err.kind, NormalizeErrorKind::UnsupportedFormat(_)));
}

#[tokio::test]
async fn corrupt_header_is_a_decode_error() {
    let mut truncated = encoded(&raster(8, 8, [1, 2, 3]), ImageFormat::Png);
    truncated.truncate(12);
    let err = lossless_normalizer().prepare(&truncated).await.unwrap_err();
    assert!(matches!(err.kind, NormalizeErrorKind::Decode(_)));
}

#[tokio::test]
async fn webp_input_passes_through_unchanged() {
    let encoder = Arc::new(CountingEncoder::default());
    let normalizer = WebpNormalizer::new(encoder.clone());
    let raw = webp(20, 30, [200, 10, 10]);

    let prepared = normalizer.prepare(&raw).await.unwrap();

    assert_eq!(prepared.data().as_ref(), raw.as_slice());
    assert_eq!(prepared.sha256(), &fingerprint(&raw));
    assert_eq!(*prepared.mode(), NormalizeMode::PassThrough);
    assert_eq!((*prepared.width(), *prepared.height()), (20, 30));
    assert_eq!(*prepared.orientation(), Orientation::Vertical);
    assert_eq!(prepared.original_mime(), "image/webp");
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pass_through_can_be_disabled() {
    let encoder = Arc::new(CountingEncoder::default());
    let normalizer = WebpNormalizer::new(encoder.clone()).with_pass_through(false);

    let prepared = normalizer.prepare(&webp(10, 10, [0, 0, 0])).await.unwrap();

    assert_eq!(*prepared.mode(), NormalizeMode::Transcoded);
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn png_is_transcoded_to_webp() {
    let raw = encoded(&raster(16, 16, [30, 60, 90]), ImageFormat::Png);

    let prepared = lossless_normalizer().prepare(&raw).await.unwrap();

    assert_eq!(*prepared.mode(), NormalizeMode::Transcoded);
    assert_eq!(prepared.content_type(), "image/webp");
    assert_eq!(prepared.original_mime(), "image/png");
    assert_eq!(probe(prepared.data()).unwrap().format, ImageFormat::WebP);
    assert_eq!(prepared.sha256(), &fingerprint(prepared.data()));
    assert_eq!(*prepared.bytes(), prepared.data().len() as u64);
    // Square ties go horizontal
    assert_eq!(*prepared.orientation(), Orientation::Horizontal);
}

#[tokio::test]
async fn dimensions_come_from_encoder_output() {
    let normalizer = WebpNormalizer::new(Arc::new(RotatingEncoder));
    let raw = encoded(&raster(10, 40, [5, 5, 5]), ImageFormat::Png);

    let prepared = normalizer.prepare(&raw).await.unwrap();

    assert_eq!((*prepared.width(), *prepared.height()), (40, 10));
    assert_eq!(*prepared.orientation(), Orientation::Horizontal);
}

#[tokio::test]
async fn encoder_failure_surfaces_diagnostic() {
    let normalizer = WebpNormalizer::new(Arc::new(FailingEncoder));
    let raw = encoded(&raster(4, 4, [9, 9, 9]), ImageFormat::Png);

    let err = normalizer.prepare(&raw).await.unwrap_err();

    match err.kind {
        NormalizeErrorKind::EncodeFailed(message) => {
            assert!(message.contains("unsupported color profile"))
        }
        other => panic!("expected EncodeFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn identical_pixels_in_different_containers_share_a_fingerprint() {
    let picture = raster(12, 7, [120, 45, 200]);
    let as_png = encoded(&picture, ImageFormat::Png);
    let as_bmp = encoded(&picture, ImageFormat::Bmp);
    assert_ne!(as_png, as_bmp);

    let normalizer = lossless_normalizer();
    let from_png = normalizer.prepare(&as_png).await.unwrap();
    let from_bmp = normalizer.prepare(&as_bmp).await.unwrap();

    assert_eq!(from_png.sha256(), from_bmp.sha256());
    assert_ne!(from_png.original_mime(), from_bmp.original_mime());
}

#[tokio::test]
async fn different_pixels_keep_distinct_fingerprints() {
    let normalizer = lossless_normalizer();
    let a = normalizer
        .prepare(&encoded(&raster(12, 7, [1, 2, 3]), ImageFormat::Png))
        .await
        .unwrap();
    let b = normalizer
        .prepare(&encoded(&raster(12, 7, [1, 2, 4]), ImageFormat::Png))
        .await
        .unwrap();

    assert_ne!(a.sha256(), b.sha256());
}

#[tokio::test]
async fn strict_processor_accepts_only_webp() {
    let raw = webp(30, 20, [0, 255, 0]);
    let prepared = StrictWebpProcessor.prepare(&raw).await.unwrap();
    assert_eq!(prepared.data().as_ref(), raw.as_slice());
    assert_eq!(*prepared.orientation(), Orientation::Horizontal);

    let png = encoded(&raster(30, 20, [0, 255, 0]), ImageFormat::Png);
    let err = StrictWebpProcessor.prepare(&png).await.unwrap_err();
    match err.kind {
        NormalizeErrorKind::UnsupportedFormat(message) => assert!(message.contains("image/png")),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}
