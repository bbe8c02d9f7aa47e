// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for photo capture and export

use image::{Rgba, RgbaImage};
use promo_studio::backends::media::CameraFrame;
use promo_studio::backends::virtual_media::{VirtualMediaDevices, VirtualRecorderFactory, test_pattern};
use promo_studio::canvas::Color;
use promo_studio::errors::PhotoError;
use promo_studio::pipelines::photo::{PhotoPipeline, cover_fit};
use promo_studio::storage::ArtifactNamer;
use promo_studio::{AppError, CaptureSession, FilterPreset, StudioConfig};

fn solid(width: u32, height: u32, color: [u8; 4]) -> CameraFrame {
    CameraFrame::from_image(&RgbaImage::from_pixel(width, height, Rgba(color)))
}

#[test]
fn test_cover_fit_crops_evenly() {
    // Landscape 640x480 onto portrait 1080x1920: height limits, width overflows
    let crop = cover_fit(640, 480, 1080, 1920);
    assert_eq!(crop.scale, 4.0);
    assert_eq!((crop.width, crop.height), (270.0, 480.0));
    assert_eq!((crop.x, crop.y), (185.0, 0.0));

    // Tall frame onto a square target: width limits, height overflows
    let crop = cover_fit(100, 400, 200, 200);
    assert_eq!(crop.scale, 2.0);
    assert_eq!((crop.x, crop.y), (0.0, 150.0));
    assert_eq!((crop.width, crop.height), (100.0, 100.0));
}

#[test]
fn test_capture_covers_target_without_letterbox() {
    let pipeline = PhotoPipeline::new(108, 192);
    for (fw, fh) in [(640, 480), (480, 640), (300, 300), (1920, 1080)] {
        let image = pipeline.compose(&solid(fw, fh, [200, 100, 50, 255]), None).unwrap();
        assert_eq!(image.dimensions(), (108, 192));
        assert!(
            image.pixels().all(|p| p.0 == [200, 100, 50, 255]),
            "uncovered border for {}x{}",
            fw,
            fh
        );
    }
}

#[test]
fn test_mirror_flips_frame() {
    let frame = CameraFrame::from_image(&test_pattern(400, 400));
    let plain = PhotoPipeline::new(100, 100).compose(&frame, None).unwrap();
    let mirrored = PhotoPipeline::new(100, 100)
        .with_mirror(true)
        .compose(&frame, None)
        .unwrap();
    assert_eq!(plain.get_pixel(5, 5).0, [255, 255, 255, 255]);
    assert_eq!(mirrored.get_pixel(94, 5).0, [255, 255, 255, 255]);
    assert_ne!(mirrored.get_pixel(5, 5).0, [255, 255, 255, 255]);
}

#[test]
fn test_bw_filter_removes_color() {
    let image = PhotoPipeline::new(20, 20)
        .with_filter(FilterPreset::Bw)
        .compose(&solid(20, 20, [220, 40, 90, 255]), None)
        .unwrap();
    assert!(image.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
}

#[tokio::test]
async fn test_capture_requires_frame() {
    let pipeline = PhotoPipeline::new(108, 192);
    let result = pipeline.capture(None, None, &ArtifactNamer::new()).await;
    assert_eq!(result, Err(PhotoError::NoFrameAvailable));

    let empty = CameraFrame::from_image(&RgbaImage::new(0, 0));
    let result = pipeline.capture(Some(empty), None, &ArtifactNamer::new()).await;
    assert_eq!(result, Err(PhotoError::NoFrameAvailable));
}

#[tokio::test]
async fn test_session_capture_without_stream_fails() {
    let session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        StudioConfig::default(),
    )
    .unwrap();
    let err = session.capture_photo().await.unwrap_err();
    assert_eq!(err, AppError::Photo(PhotoError::NoFrameAvailable));
}

#[tokio::test]
async fn test_session_capture_exports_full_size_png() {
    let mut session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        StudioConfig::default(),
    )
    .unwrap();
    session.open().await.unwrap();
    session.set_filter(FilterPreset::Warm);
    session
        .stickers_mut()
        .add_label("HOT", Color::rgb(249, 115, 22), Color::WHITE);

    let artifact = session.capture_photo().await.unwrap();
    assert_eq!(artifact.mime_type, "image/png");
    assert!(artifact.file_name.starts_with("photo-"));
    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1920));
    assert_eq!(session.preview_css(), "saturate(1.1) hue-rotate(-10deg)");
}

#[test]
fn test_overlay_is_transparent_outside_stickers() {
    let session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        StudioConfig::default(),
    )
    .unwrap();
    let png = session.export_overlay_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (1080, 1920));
    assert_eq!(decoded.get_pixel(0, 0)[3], 0);
}

#[tokio::test]
async fn test_session_photo_includes_emoji_and_text() {
    let mut session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        StudioConfig::default(),
    )
    .unwrap();
    session.open().await.unwrap();
    let plain = session.capture_photo().await.unwrap();

    session.stickers_mut().add_emoji("❤️");
    session.stickers_mut().add_text("Hurry Up!", Color::WHITE).unwrap();
    let decorated = session.capture_photo().await.unwrap();

    let plain = image::load_from_memory(&plain.bytes).unwrap().to_rgba8();
    let decorated = image::load_from_memory(&decorated.bytes).unwrap().to_rgba8();
    let changed = plain
        .pixels()
        .zip(decorated.pixels())
        .filter(|(a, b)| a != b)
        .count();
    assert!(changed > 1000, "only {} pixels changed", changed);
}

#[tokio::test]
async fn test_session_photo_reports_unrenderable_emoji() {
    let mut session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        StudioConfig::default(),
    )
    .unwrap();
    session.open().await.unwrap();
    session.stickers_mut().add_emoji("🔥");

    let err = session.capture_photo().await.unwrap_err();
    assert_eq!(err, AppError::Photo(PhotoError::GlyphUnavailable("🔥".to_string())));
    assert!(session.export_overlay_png().is_err());
}
