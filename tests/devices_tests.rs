// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for device negotiation and the capture session

use promo_studio::backends::media::{DeviceNegotiator, StreamConstraints};
use promo_studio::backends::virtual_media::{
    PermissionBehavior, VirtualMediaDevices, VirtualRecorderFactory,
};
use promo_studio::errors::{DeviceError, RecordingError};
use promo_studio::{AppError, CaptureMode, CaptureSession, Facing, StudioConfig};
use std::time::Duration;

fn current_device(negotiator: &DeviceNegotiator<VirtualMediaDevices>) -> Option<String> {
    negotiator
        .stream()
        .and_then(|s| s.device_id().map(str::to_string))
}

#[tokio::test]
async fn test_double_switch_returns_to_original_device() {
    let devices = VirtualMediaDevices::default();
    let mut negotiator = DeviceNegotiator::new(devices.clone());
    negotiator.open(StreamConstraints::default()).await.unwrap();
    let original = current_device(&negotiator);
    assert_eq!(original.as_deref(), Some("virtual-front"));

    assert!(negotiator.switch_facing().await.unwrap());
    assert_eq!(current_device(&negotiator).as_deref(), Some("virtual-back"));
    assert_eq!(negotiator.facing(), Facing::Back);

    assert!(negotiator.switch_facing().await.unwrap());
    assert_eq!(current_device(&negotiator), original);

    // One initial open plus exactly two stop+open cycles, never overlapping
    assert_eq!(negotiator.acquisitions(), 3);
    assert_eq!(devices.acquisitions(), 3);
    assert_eq!(devices.max_concurrent_streams(), 1);
    assert_eq!(devices.open_streams(), 1);
}

#[tokio::test]
async fn test_single_camera_switch_is_noop() {
    let devices = VirtualMediaDevices::single_camera();
    let mut negotiator = DeviceNegotiator::new(devices.clone());
    negotiator.open(StreamConstraints::default()).await.unwrap();
    let stream_id = negotiator.stream().map(|s| s.id().to_string());

    assert!(!negotiator.switch_facing().await.unwrap());
    assert!(!negotiator.can_switch());
    assert_eq!(negotiator.stream().map(|s| s.id().to_string()), stream_id);
    assert_eq!(devices.acquisitions(), 1);
}

#[tokio::test]
async fn test_permission_denied_leaves_no_stream() {
    let devices = VirtualMediaDevices::default().with_permission(PermissionBehavior::Denied);
    let mut negotiator = DeviceNegotiator::new(devices.clone());
    assert_eq!(
        negotiator.open(StreamConstraints::default()).await,
        Err(DeviceError::PermissionDenied)
    );
    assert!(!negotiator.has_stream());
    assert_eq!(devices.open_streams(), 0);
    assert!(!DeviceError::PermissionDenied.is_retryable());
}

#[tokio::test]
async fn test_hidden_labels_use_positional_fallback() {
    let devices = VirtualMediaDevices::default().hide_labels_until_granted();
    let mut negotiator = DeviceNegotiator::new(devices.clone());
    let listed = negotiator.enumerate_devices().await.unwrap().to_vec();
    assert!(listed.iter().all(|d| d.label.is_empty()));

    negotiator.open(StreamConstraints::default()).await.unwrap();
    assert!(negotiator.switch_facing().await.unwrap());
    assert_eq!(current_device(&negotiator).as_deref(), Some("virtual-back"));
}

#[tokio::test]
async fn test_probe_reveals_labels() {
    let devices = VirtualMediaDevices::default().hide_labels_until_granted();
    let mut negotiator = DeviceNegotiator::new(devices.clone());
    negotiator.probe_permission().await.unwrap();
    assert!(!negotiator.has_stream());
    assert_eq!(devices.open_streams(), 0);
    assert!(negotiator.known_devices().iter().all(|d| !d.label.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_pending_permission_times_out() {
    let devices = VirtualMediaDevices::default().with_permission(PermissionBehavior::Pending);
    let mut negotiator =
        DeviceNegotiator::new(devices).with_permission_timeout(Some(Duration::from_millis(50)));
    assert_eq!(
        negotiator.open(StreamConstraints::default()).await,
        Err(DeviceError::PermissionTimeout)
    );
    assert!(!negotiator.has_stream());
}

#[tokio::test]
async fn test_session_locks_camera_while_recording() {
    let mut session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        StudioConfig::default(),
    )
    .unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();
    session.open().await.unwrap();
    session.start_recording().unwrap();

    let err = session.switch_facing().await.unwrap_err();
    assert_eq!(err, AppError::Recording(RecordingError::ModeLocked));
    assert_eq!(session.facing(), Facing::Front);

    session.recorders().last_recorder().unwrap().push_data(b"clip");
    let artifact = session.stop_recording().await.unwrap();
    assert_eq!(artifact.bytes, b"clip".to_vec());

    assert!(session.switch_facing().await.unwrap());
    assert_eq!(session.facing(), Facing::Back);
    assert!(!session.is_mirrored());
}

#[tokio::test]
async fn test_session_uses_configured_facing() {
    let mut config = StudioConfig::default();
    config.video.facing = Facing::Back;
    let mut session = CaptureSession::new(
        VirtualMediaDevices::default(),
        VirtualRecorderFactory::default(),
        config,
    )
    .unwrap();
    session.open().await.unwrap();
    assert_eq!(
        session.negotiator().stream().and_then(|s| s.device_id()),
        Some("virtual-back")
    );
    assert!(session.can_switch());
}
