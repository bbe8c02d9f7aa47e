// SPDX-License-Identifier: GPL-3.0-only

//! Media device abstraction
//!
//! ```text
//! ┌──────────────────────┐
//! │    CaptureSession    │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │   DeviceNegotiator   │      │  RecordingController │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │                             │
//!            ▼                             ▼
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  MediaDevices trait  │      │ RecorderFactory trait│  ← platform seams
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            ▼                             ▼
//!   browser / native / virtual    browser / native / virtual
//! ```
//!
//! A stream is owned by exactly one holder and must be stopped before
//! another one is requested. Backends are allowed to refuse a second
//! concurrent open.

pub mod negotiator;
pub mod types;

pub use negotiator::DeviceNegotiator;
pub use types::*;

use crate::errors::DeviceError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::time::Duration;

/// Camera and microphone access
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Request a stream; suspends while the platform asks for permission
    async fn get_user_media(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceError>;

    /// List video inputs. Labels may be empty before permission is granted.
    async fn enumerate_video_inputs(&self) -> Result<Vec<VideoDeviceInfo>, DeviceError>;
}

/// A live capture stream
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    fn tracks(&self) -> Vec<TrackInfo>;

    fn audio_track_count(&self) -> usize {
        self.tracks()
            .iter()
            .filter(|t| t.kind == TrackKind::Audio)
            .count()
    }

    fn video_track_count(&self) -> usize {
        self.tracks()
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .count()
    }

    /// Device the video track was opened on, when the backend knows it
    fn device_id(&self) -> Option<&str>;

    /// Most recent preview frame, `None` before the first frame arrives
    fn current_frame(&self) -> Option<CameraFrame>;

    /// Stop every track and release the hardware. Idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Recorder construction parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecorderOptions {
    /// Container/codec MIME string; empty lets the backend choose
    pub mime_type: String,
    pub bits_per_second: Option<u32>,
}

/// Event delivered by a running recorder, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A slice of encoded data; may be empty
    Data(Vec<u8>),
    /// The recorder has flushed and stopped
    Stopped,
    /// The recorder failed while running
    Error(String),
}

pub type RecorderEventStream = BoxStream<'static, RecorderEvent>;

/// Recorder construction and format probing
pub trait RecorderFactory: Send + Sync {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Build a recorder for `stream`. Fails with the platform's message
    /// when the options are rejected.
    fn create(
        &self,
        stream: &dyn MediaStream,
        options: &RecorderOptions,
    ) -> Result<Box<dyn MediaRecorder>, String>;
}

/// A constructed recorder
pub trait MediaRecorder: Send {
    /// MIME type the recorder actually produces, empty if unknown
    fn mime_type(&self) -> &str;

    /// Begin recording, emitting data every `timeslice`
    fn start(&mut self, timeslice: Duration) -> Result<RecorderEventStream, String>;

    /// Ask the recorder to flush; a final `Data` and then `Stopped` follow
    fn stop(&mut self);
}
