//! `cwebp` encoder tests against stand-in shell scripts.
#![cfg(unix)]

use curator_error::NormalizeErrorKind;
use curator_normalize::{
    CwebpEncoder, Encoder, ImageProcessor, LosslessWebpEncoder, NormalizeConfig, WebpNormalizer,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tempfile::TempDir;

// A script being written while another test forks can fail to exec with
// "text file busy"; run these one at a time.
static SERIAL: LazyLock<tokio::sync::Mutex<()>> = LazyLock::new(|| tokio::sync::Mutex::new(()));

struct Fixture {
    dir: TempDir,
    scratch: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        Self { dir, scratch }
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn encoder(&self, binary: &Path) -> CwebpEncoder {
        CwebpEncoder::new(
            &NormalizeConfig::default()
                .with_cwebp_binary(binary.display().to_string())
                .with_scratch_root(self.scratch.clone()),
        )
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(&self.scratch).unwrap().next().is_none()
    }
}

fn picture() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 9, Rgb([10, 20, 30])))
}

/// Copies `fixture` to whatever follows `-o` and records the arguments.
fn copying_script(fixture: &Path, args_log: &Path) -> String {
    format!(
        r#"echo "$@" > "{log}"
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then shift; cp "{fixture}" "$1"; fi
  shift
done"#,
        log = args_log.display(),
        fixture = fixture.display()
    )
}

#[tokio::test]
async fn successful_run_returns_output_and_cleans_scratch() {
    let _guard = SERIAL.lock().await;
    let fx = Fixture::new();
    let webp = LosslessWebpEncoder::encode_blocking(&DynamicImage::ImageRgb8(
        RgbImage::from_pixel(50, 20, Rgb([1, 1, 1])),
    ))
    .unwrap();
    let fixture = fx.dir.path().join("fixture.webp");
    std::fs::write(&fixture, &webp).unwrap();
    let args_log = fx.dir.path().join("args.txt");
    let bin = fx.script("cwebp-ok", &copying_script(&fixture, &args_log));

    let out = fx.encoder(&bin).encode(picture()).await.unwrap();

    assert_eq!(out, webp);
    let args = std::fs::read_to_string(&args_log).unwrap();
    assert!(args.starts_with("-quiet -mt -q 84 -m 4 "), "args: {}", args);
    assert!(args.contains("input.png -o "));
    assert!(fx.scratch_is_empty());
}

#[test]
fn clamped_quality_and_method_reach_the_command_line() {
    let encoder = CwebpEncoder::new(
        &NormalizeConfig::default()
            .with_quality(250)
            .with_method(9),
    );
    let args = encoder.args(Path::new("in.png"), Path::new("out.webp"));
    assert_eq!(
        args,
        vec!["-quiet", "-mt", "-q", "100", "-m", "6", "in.png", "-o", "out.webp"]
    );
}

#[tokio::test]
async fn nonzero_exit_is_encode_failed_with_diagnostic() {
    let _guard = SERIAL.lock().await;
    let fx = Fixture::new();
    let bin = fx.script("cwebp-fail", "echo 'Error! Cannot read input picture' >&2\nexit 1");

    let err = fx.encoder(&bin).encode(picture()).await.unwrap_err();

    match err.kind {
        NormalizeErrorKind::EncodeFailed(message) => {
            assert!(message.starts_with("cwebp failed:"));
            assert!(message.contains("Cannot read input picture"));
        }
        other => panic!("expected EncodeFailed, got {:?}", other),
    }
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn empty_output_is_encode_failed() {
    let _guard = SERIAL.lock().await;
    let fx = Fixture::new();
    let bin = fx.script(
        "cwebp-empty",
        r#"while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then shift; : > "$1"; fi
  shift
done"#,
    );

    let err = fx.encoder(&bin).encode(picture()).await.unwrap_err();

    assert_eq!(
        err.kind,
        NormalizeErrorKind::EncodeFailed("cwebp produced empty output".to_string())
    );
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn missing_binary_is_encode_failed() {
    let _guard = SERIAL.lock().await;
    let fx = Fixture::new();
    let missing = fx.dir.path().join("no-such-cwebp");

    let err = fx.encoder(&missing).encode(picture()).await.unwrap_err();

    assert!(matches!(err.kind, NormalizeErrorKind::EncodeFailed(_)));
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn dropped_encode_kills_child_and_removes_scratch() {
    let _guard = SERIAL.lock().await;
    let fx = Fixture::new();
    let bin = fx.script("cwebp-slow", "sleep 30");

    let encoder = fx.encoder(&bin);
    let result = tokio::time::timeout(Duration::from_millis(500), encoder.encode(picture())).await;

    assert!(result.is_err(), "encode should still be running");
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn normalizer_uses_cwebp_output_dimensions() {
    let _guard = SERIAL.lock().await;
    let fx = Fixture::new();
    let webp = LosslessWebpEncoder::encode_blocking(&DynamicImage::ImageRgb8(
        RgbImage::from_pixel(20, 50, Rgb([7, 7, 7])),
    ))
    .unwrap();
    let fixture = fx.dir.path().join("fixture.webp");
    std::fs::write(&fixture, &webp).unwrap();
    let bin = fx.script(
        "cwebp-ok",
        &copying_script(&fixture, &fx.dir.path().join("args.txt")),
    );
    let config = NormalizeConfig::default()
        .with_cwebp_binary(bin.display().to_string())
        .with_scratch_root(fx.scratch.clone());

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])))
        .write_to(&mut png, ImageFormat::Png)
        .unwrap();
    let prepared = WebpNormalizer::from_config(&config)
        .prepare(png.get_ref())
        .await
        .unwrap();

    assert_eq!(prepared.data().as_ref(), webp.as_slice());
    assert_eq!((*prepared.width(), *prepared.height()), (20, 50));
    assert_eq!(prepared.orientation().as_str(), "v");
    assert!(fx.scratch_is_empty());
}
