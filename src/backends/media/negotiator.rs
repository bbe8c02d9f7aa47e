// SPDX-License-Identifier: GPL-3.0-only

//! Single-stream device negotiation
//!
//! Holds at most one live stream. Every change of device, facing or audio
//! requirement is a full stop-then-open cycle; the old stream is always
//! stopped before the new request is issued.

use super::{CameraFrame, Facing, MediaDevices, MediaStream, StreamConstraints, VideoDeviceInfo};
use crate::errors::DeviceError;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct DeviceNegotiator<D: MediaDevices> {
    devices: D,
    stream: Option<Box<dyn MediaStream>>,
    constraints: StreamConstraints,
    known_devices: Vec<VideoDeviceInfo>,
    permission_timeout: Option<Duration>,
    acquisitions: u64,
}

impl<D: MediaDevices> DeviceNegotiator<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            stream: None,
            constraints: StreamConstraints::default(),
            known_devices: Vec::new(),
            permission_timeout: None,
            acquisitions: 0,
        }
    }

    /// Fail opens that wait longer than `timeout` for permission
    pub fn with_permission_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.permission_timeout = timeout;
        self
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// Open a stream for `constraints`, replacing any current one.
    ///
    /// On failure no stream is held.
    pub async fn open(&mut self, constraints: StreamConstraints) -> Result<(), DeviceError> {
        self.stop_current();

        info!(
            width = constraints.width,
            height = constraints.height,
            frame_rate = constraints.frame_rate,
            facing = %constraints.facing,
            device_id = ?constraints.device_id,
            audio = constraints.audio.is_some(),
            "Requesting camera stream"
        );

        let request = self.devices.get_user_media(&constraints);
        let result = match self.permission_timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Camera permission request timed out");
                    Err(DeviceError::PermissionTimeout)
                }
            },
            None => request.await,
        };

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Failed to open camera stream");
                return Err(e);
            }
        };

        self.acquisitions += 1;
        info!(
            stream_id = stream.id(),
            device_id = ?stream.device_id(),
            audio_tracks = stream.audio_track_count(),
            video_tracks = stream.video_track_count(),
            "Camera stream opened"
        );
        self.constraints = constraints;
        self.stream = Some(stream);
        Ok(())
    }

    /// Refresh the list of video inputs
    pub async fn enumerate_devices(&mut self) -> Result<&[VideoDeviceInfo], DeviceError> {
        let devices = self.devices.enumerate_video_inputs().await?;
        debug!(
            count = devices.len(),
            labelled = devices.iter().filter(|d| !d.label.is_empty()).count(),
            "Enumerated video inputs"
        );
        self.known_devices = devices;
        Ok(&self.known_devices)
    }

    pub fn known_devices(&self) -> &[VideoDeviceInfo] {
        &self.known_devices
    }

    /// Whether a camera switch affordance should be offered
    pub fn can_switch(&self) -> bool {
        self.known_devices.len() >= 2
    }

    /// Reopen on the camera facing the other way.
    ///
    /// Returns `Ok(false)` without touching the stream when fewer than two
    /// cameras exist.
    pub async fn switch_facing(&mut self) -> Result<bool, DeviceError> {
        if self.known_devices.is_empty() {
            self.enumerate_devices().await?;
        }
        if !self.can_switch() {
            debug!(devices = self.known_devices.len(), "Camera switch unavailable");
            return Ok(false);
        }

        let target = self.constraints.facing.opposite();
        let device_id = self.resolve_device(target);
        info!(from = %self.constraints.facing, to = %target, device_id = ?device_id, "Switching camera");

        let constraints = StreamConstraints {
            facing: target,
            device_id,
            ..self.constraints.clone()
        };
        self.open(constraints).await?;
        Ok(true)
    }

    /// Pick a concrete device for `facing`.
    ///
    /// Labelled devices are matched by name; when labels are hidden the
    /// first two devices stand in for front and back.
    fn resolve_device(&self, facing: Facing) -> Option<String> {
        let devices = &self.known_devices;
        if devices.is_empty() {
            return None;
        }

        let labelled = devices.iter().any(|d| !d.label.is_empty());
        if labelled {
            if let Some(device) = devices.iter().find(|d| facing.matches_label(&d.label)) {
                return Some(device.device_id.clone());
            }
            // Labels that name no direction: take any other camera
            let current = self.current_device_id();
            if let Some(device) = devices
                .iter()
                .find(|d| Some(d.device_id.as_str()) != current.as_deref())
            {
                return Some(device.device_id.clone());
            }
        }

        let index = facing.positional_index().min(devices.len() - 1);
        Some(devices[index].device_id.clone())
    }

    fn current_device_id(&self) -> Option<String> {
        self.stream
            .as_ref()
            .and_then(|s| s.device_id().map(str::to_string))
            .or_else(|| self.constraints.device_id.clone())
    }

    /// Open and immediately release a stream to learn whether access is
    /// granted. A held stream already proves it.
    pub async fn probe_permission(&mut self) -> Result<(), DeviceError> {
        if self.has_stream() {
            return Ok(());
        }
        let probe = StreamConstraints {
            audio: None,
            ..self.constraints.clone()
        };
        let mut stream = self.devices.get_user_media(&probe).await?;
        stream.stop();
        debug!("Camera permission probe succeeded");
        // Labels become visible once permission is granted
        if let Err(e) = self.enumerate_devices().await {
            warn!(error = %e, "Device enumeration after permission probe failed");
        }
        Ok(())
    }

    fn stop_current(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!(stream_id = stream.id(), "Stopping camera stream");
            stream.stop();
        }
    }

    /// Stop and drop the current stream
    pub fn close(&mut self) {
        if self.stream.is_some() {
            info!("Closing camera stream");
        }
        self.stop_current();
    }

    pub fn stream(&self) -> Option<&dyn MediaStream> {
        self.stream.as_deref()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn current_frame(&self) -> Option<CameraFrame> {
        self.stream.as_ref().and_then(|s| s.current_frame())
    }

    pub fn constraints(&self) -> &StreamConstraints {
        &self.constraints
    }

    pub fn facing(&self) -> Facing {
        self.constraints.facing
    }

    /// Successful stream acquisitions so far
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions
    }
}

impl<D: MediaDevices> Drop for DeviceNegotiator<D> {
    fn drop(&mut self) {
        self.stop_current();
    }
}
