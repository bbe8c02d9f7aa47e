// SPDX-License-Identifier: GPL-3.0-only

//! Software media backend
//!
//! Implements the device and recorder seams without hardware. Cameras,
//! permission outcomes, supported recorder formats and recorder output are
//! all scripted, which makes it the backend for tests and headless demos.
//!
//! Handles are cheap clones sharing one state, so a test can keep a handle
//! to inspect stream counts after giving the backend away.

mod recorder;

pub use recorder::{VirtualRecorder, VirtualRecorderFactory, VirtualRecorderHandle};

use crate::backends::media::{
    CameraFrame, Facing, MediaDevices, MediaStream, StreamConstraints, TrackInfo, TrackKind,
    VideoDeviceInfo,
};
use crate::errors::DeviceError;
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// How the simulated permission prompt resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionBehavior {
    Granted,
    Denied,
    /// The prompt never resolves
    Pending,
}

/// A simulated camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualCamera {
    pub device_id: String,
    pub label: String,
    pub facing: Facing,
    /// Native frame size produced by this camera
    pub frame_size: (u32, u32),
}

impl VirtualCamera {
    pub fn new(device_id: &str, label: &str, facing: Facing) -> Self {
        Self {
            device_id: device_id.to_string(),
            label: label.to_string(),
            facing,
            frame_size: (640, 480),
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }
}

#[derive(Debug)]
struct DeviceState {
    cameras: Vec<VirtualCamera>,
    permission: PermissionBehavior,
    granted: bool,
    hide_labels_until_granted: bool,
    microphone: bool,
    video_tracks: bool,
    open_streams: usize,
    max_concurrent: usize,
    acquisitions: u64,
    requests: Vec<StreamConstraints>,
    next_stream: u64,
}

/// Scripted camera/microphone provider
#[derive(Debug, Clone)]
pub struct VirtualMediaDevices {
    state: Arc<Mutex<DeviceState>>,
}

impl Default for VirtualMediaDevices {
    fn default() -> Self {
        Self::new(vec![
            VirtualCamera::new("virtual-front", "Virtual Front Camera", Facing::Front),
            VirtualCamera::new("virtual-back", "Virtual Back Camera", Facing::Back),
        ])
    }
}

impl VirtualMediaDevices {
    /// Permission granted, microphone present
    pub fn new(cameras: Vec<VirtualCamera>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                cameras,
                permission: PermissionBehavior::Granted,
                granted: false,
                hide_labels_until_granted: false,
                microphone: true,
                video_tracks: true,
                open_streams: 0,
                max_concurrent: 0,
                acquisitions: 0,
                requests: Vec::new(),
                next_stream: 0,
            })),
        }
    }

    pub fn single_camera() -> Self {
        Self::new(vec![VirtualCamera::new(
            "virtual-front",
            "Virtual Front Camera",
            Facing::Front,
        )])
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_permission(self, permission: PermissionBehavior) -> Self {
        self.set_permission(permission);
        self
    }

    /// Report empty labels until a stream has been granted once
    pub fn hide_labels_until_granted(self) -> Self {
        self.state().hide_labels_until_granted = true;
        self
    }

    pub fn without_microphone(self) -> Self {
        self.state().microphone = false;
        self
    }

    /// Streams carry no video track, e.g. a camera that failed after the
    /// grant; audio is still delivered when requested
    pub fn without_video_tracks(self) -> Self {
        self.state().video_tracks = false;
        self
    }

    pub fn set_permission(&self, permission: PermissionBehavior) {
        self.state().permission = permission;
    }

    /// Streams currently open
    pub fn open_streams(&self) -> usize {
        self.state().open_streams
    }

    /// Highest number of simultaneously open streams seen
    pub fn max_concurrent_streams(&self) -> usize {
        self.state().max_concurrent
    }

    pub fn acquisitions(&self) -> u64 {
        self.state().acquisitions
    }

    /// Every constraint set passed to `get_user_media`, in order
    pub fn requests(&self) -> Vec<StreamConstraints> {
        self.state().requests.clone()
    }

    fn pick_camera(cameras: &[VirtualCamera], constraints: &StreamConstraints) -> Option<VirtualCamera> {
        if let Some(id) = &constraints.device_id {
            return cameras.iter().find(|c| &c.device_id == id).cloned();
        }
        cameras
            .iter()
            .find(|c| c.facing == constraints.facing)
            .or_else(|| cameras.first())
            .cloned()
    }
}

#[async_trait]
impl MediaDevices for VirtualMediaDevices {
    async fn get_user_media(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError> {
        let permission = {
            let mut state = self.state();
            state.requests.push(constraints.clone());
            state.permission
        };

        match permission {
            PermissionBehavior::Denied => return Err(DeviceError::PermissionDenied),
            PermissionBehavior::Pending => {
                futures::future::pending::<()>().await;
                return Err(DeviceError::PermissionTimeout);
            }
            PermissionBehavior::Granted => {}
        }

        let mut state = self.state();
        if state.open_streams > 0 {
            return Err(DeviceError::StreamInUse);
        }
        let camera = Self::pick_camera(&state.cameras, constraints).ok_or_else(|| {
            DeviceError::DeviceUnavailable(match &constraints.device_id {
                Some(id) => format!("no camera with id {}", id),
                None => "no cameras found".to_string(),
            })
        })?;

        state.granted = true;
        state.open_streams += 1;
        state.max_concurrent = state.max_concurrent.max(state.open_streams);
        state.acquisitions += 1;
        state.next_stream += 1;

        let mut tracks = Vec::new();
        if state.video_tracks {
            tracks.push(TrackInfo {
                kind: TrackKind::Video,
                label: camera.label.clone(),
            });
        }
        if constraints.audio.is_some() && state.microphone {
            tracks.push(TrackInfo {
                kind: TrackKind::Audio,
                label: "Virtual Microphone".to_string(),
            });
        }

        let id = format!("virtual-stream-{}", state.next_stream);
        debug!(stream_id = %id, device_id = %camera.device_id, "Virtual stream opened");
        let frame = CameraFrame::from_image(&test_pattern(camera.frame_size.0, camera.frame_size.1));

        Ok(Box::new(VirtualStream {
            id,
            device_id: camera.device_id,
            tracks,
            frame: Some(frame),
            active: true,
            devices: self.state.clone(),
        }))
    }

    async fn enumerate_video_inputs(&self) -> Result<Vec<VideoDeviceInfo>, DeviceError> {
        let state = self.state();
        let hide = state.hide_labels_until_granted && !state.granted;
        Ok(state
            .cameras
            .iter()
            .map(|c| VideoDeviceInfo {
                device_id: c.device_id.clone(),
                label: if hide { String::new() } else { c.label.clone() },
            })
            .collect())
    }
}

/// Stream handed out by [`VirtualMediaDevices`]
pub struct VirtualStream {
    id: String,
    device_id: String,
    tracks: Vec<TrackInfo>,
    frame: Option<CameraFrame>,
    active: bool,
    devices: Arc<Mutex<DeviceState>>,
}

impl VirtualStream {
    /// Replace the frame returned by `current_frame`
    pub fn set_frame(&mut self, frame: Option<CameraFrame>) {
        self.frame = frame;
    }
}

impl MediaStream for VirtualStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<TrackInfo> {
        if self.active {
            self.tracks.clone()
        } else {
            Vec::new()
        }
    }

    fn device_id(&self) -> Option<&str> {
        Some(&self.device_id)
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        if self.active { self.frame.clone() } else { None }
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let mut state = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        state.open_streams = state.open_streams.saturating_sub(1);
        debug!(stream_id = %self.id, "Virtual stream stopped");
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for VirtualStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Horizontal hue ramp over a vertical brightness ramp, with a white marker
/// in the top-left quadrant so mirroring is visible
pub fn test_pattern(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 4 && y < height / 4 {
            return Rgba([255, 255, 255, 255]);
        }
        let fx = x as f32 / width.max(1) as f32;
        let fy = y as f32 / height.max(1) as f32;
        Rgba([
            (fx * 255.0) as u8,
            ((1.0 - fx) * 200.0 * (1.0 - fy * 0.5)) as u8,
            (fy * 255.0) as u8,
            255,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::media::AudioConstraints;

    #[tokio::test]
    async fn test_second_open_refused_while_first_active() {
        let devices = VirtualMediaDevices::default();
        let mut first = devices
            .get_user_media(&StreamConstraints::default())
            .await
            .unwrap();
        let second = devices.get_user_media(&StreamConstraints::default()).await;
        assert!(matches!(second, Err(DeviceError::StreamInUse)));

        first.stop();
        first.stop();
        assert_eq!(devices.open_streams(), 0);
        assert!(devices.get_user_media(&StreamConstraints::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_audio_track_only_when_requested_and_present() {
        let devices = VirtualMediaDevices::default();
        let constraints = StreamConstraints {
            audio: Some(AudioConstraints::default()),
            ..StreamConstraints::default()
        };
        let stream = devices.get_user_media(&constraints).await.unwrap();
        assert_eq!(stream.audio_track_count(), 1);
        drop(stream);

        let silent = VirtualMediaDevices::default().without_microphone();
        let stream = silent.get_user_media(&constraints).await.unwrap();
        assert_eq!(stream.audio_track_count(), 0);
        assert_eq!(stream.video_track_count(), 1);
    }

    #[tokio::test]
    async fn test_labels_hidden_until_granted() {
        let devices = VirtualMediaDevices::default().hide_labels_until_granted();
        let before = devices.enumerate_video_inputs().await.unwrap();
        assert!(before.iter().all(|d| d.label.is_empty()));

        let _stream = devices
            .get_user_media(&StreamConstraints::default())
            .await
            .unwrap();
        let after = devices.enumerate_video_inputs().await.unwrap();
        assert!(after.iter().all(|d| !d.label.is_empty()));
    }

    #[tokio::test]
    async fn test_denied_permission() {
        let devices = VirtualMediaDevices::default().with_permission(PermissionBehavior::Denied);
        let result = devices.get_user_media(&StreamConstraints::default()).await;
        assert!(matches!(result, Err(DeviceError::PermissionDenied)));
        assert_eq!(devices.open_streams(), 0);
    }
}
