// SPDX-License-Identifier: GPL-3.0-only

//! Recording session controller
//!
//! ```text
//!        start()                    stop()              Stopped event
//! Idle ──────────► Armed ──► Recording ──────► Stopping ──────────────► Idle
//!   ▲                            │                                     │
//!   │                            │ runtime error                       │
//!   │                            ▼                                     │
//!   └─────────── start() ──── Failed                  (artifact or NoDataRecorded)
//! ```
//!
//! Setup errors leave the controller in `Idle`. Recorder events are applied
//! in arrival order whenever the owner pumps the controller (`pump`,
//! `next_event`) and while `stop` waits for the final flush.

use crate::backends::media::{MediaRecorder, MediaStream, RecorderEvent, RecorderEventStream, RecorderFactory};
use crate::constants::{BitratePreset, recording};
use crate::errors::RecordingError;
use crate::media::{RecordingFormat, create_recorder, extension_for_mime, resolve_format};
use crate::storage::{ArtifactKind, ArtifactNamer, MediaArtifact};
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    /// Stream validated and recorder constructed, not yet started
    Armed,
    Recording,
    /// Stop requested, waiting for the final flush
    Stopping,
    /// A runtime error ended the recording; `start` again to retry
    Failed,
}

/// Recorder parameters fixed for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSettings {
    pub timeslice: Duration,
    pub bitrate: BitratePreset,
    /// Capture size used to pick the bitrate tier
    pub width: u32,
    pub height: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            timeslice: recording::TIMESLICE,
            bitrate: BitratePreset::default(),
            width: crate::constants::capture::DEFAULT_WIDTH,
            height: crate::constants::capture::DEFAULT_HEIGHT,
        }
    }
}

pub struct RecordingController {
    state: RecordingState,
    settings: RecordingSettings,
    namer: ArtifactNamer,
    recorder: Option<Box<dyn MediaRecorder>>,
    events: Option<RecorderEventStream>,
    format: RecordingFormat,
    requested_mime: String,
    chunks: Vec<Vec<u8>>,
    /// The recorder reported `Stopped` on its own
    recorder_stopped: bool,
    last_error: Option<RecordingError>,
    elapsed: Arc<watch::Sender<u64>>,
    ticker: Option<JoinHandle<()>>,
}

impl RecordingController {
    pub fn new(settings: RecordingSettings, namer: ArtifactNamer) -> Self {
        let (elapsed, _) = watch::channel(0);
        Self {
            state: RecordingState::Idle,
            settings,
            namer,
            recorder: None,
            events: None,
            format: RecordingFormat::default(),
            requested_mime: String::new(),
            chunks: Vec::new(),
            recorder_stopped: false,
            last_error: None,
            elapsed: Arc::new(elapsed),
            ticker: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// True while the stream's data pipeline belongs to the recorder
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            RecordingState::Armed | RecordingState::Recording | RecordingState::Stopping
        )
    }

    /// Error that moved the controller to `Failed`
    pub fn last_error(&self) -> Option<&RecordingError> {
        self.last_error.as_ref()
    }

    /// Format chosen for the current or last recording
    pub fn format(&self) -> RecordingFormat {
        self.format
    }

    /// Elapsed whole seconds of the current recording
    pub fn elapsed_seconds(&self) -> u64 {
        *self.elapsed.borrow()
    }

    /// Live elapsed-seconds feed for the recording indicator
    pub fn subscribe_elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    pub fn buffered_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Validate the stream, construct a recorder and begin recording
    pub fn start(
        &mut self,
        factory: &dyn RecorderFactory,
        stream: Option<&dyn MediaStream>,
    ) -> Result<(), RecordingError> {
        if !matches!(self.state, RecordingState::Idle | RecordingState::Failed) {
            warn!(state = ?self.state, "Recording start ignored");
            return Err(RecordingError::InvalidState("start"));
        }
        self.reset();

        let stream = stream
            .filter(|s| s.is_active())
            .ok_or(RecordingError::NoStreamAvailable)?;
        if stream.video_track_count() == 0 {
            error!(stream_id = stream.id(), "Stream has no video track");
            return Err(RecordingError::NoVideoTrack);
        }

        self.format = resolve_format(factory, stream);
        let bits_per_second = self
            .settings
            .bitrate
            .bits_per_second(self.settings.width, self.settings.height);
        let created = create_recorder(factory, stream, self.format, Some(bits_per_second))?;
        let mut recorder = created.recorder;
        self.requested_mime = created.requested_mime;
        self.state = RecordingState::Armed;

        let events = match recorder.start(self.settings.timeslice) {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "Recorder failed to start");
                self.state = RecordingState::Idle;
                return Err(RecordingError::RecorderUnavailable(e));
            }
        };

        self.recorder = Some(recorder);
        self.events = Some(events);
        self.state = RecordingState::Recording;
        self.start_ticker();
        info!(
            mime = %self.requested_mime,
            bits_per_second,
            timeslice_ms = self.settings.timeslice.as_millis() as u64,
            "Recording started"
        );
        Ok(())
    }

    /// Apply every recorder event that is already available without
    /// waiting. Returns the number of events applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while self.state == RecordingState::Recording && !self.recorder_stopped {
            let Some(events) = self.events.as_mut() else {
                break;
            };
            let ready = events.next().now_or_never();
            match ready {
                Some(Some(event)) => {
                    self.apply(event);
                    applied += 1;
                }
                Some(None) => {
                    self.recorder_stopped = true;
                }
                None => break,
            }
        }
        applied
    }

    /// Wait for the next recorder event and apply it.
    ///
    /// Returns `None` when no recording is running.
    pub async fn next_event(&mut self) -> Option<RecordingState> {
        if self.state != RecordingState::Recording || self.recorder_stopped {
            return None;
        }
        let event = self.events.as_mut()?.next().await;
        match event {
            Some(event) => self.apply(event),
            None => self.recorder_stopped = true,
        }
        Some(self.state)
    }

    fn apply(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::Data(bytes) => {
                if bytes.is_empty() {
                    debug!("Skipping empty data slice");
                } else {
                    debug!(size = bytes.len(), chunk = self.chunks.len(), "Buffered data slice");
                    self.chunks.push(bytes);
                }
            }
            RecorderEvent::Stopped => {
                debug!("Recorder reported stop");
                self.recorder_stopped = true;
            }
            RecorderEvent::Error(message) => self.fail(message),
        }
    }

    fn fail(&mut self, message: String) {
        let lower = message.to_lowercase();
        let err = if lower.contains("codec") || lower.contains("audio") {
            RecordingError::AudioCodecFailure(message)
        } else {
            RecordingError::RuntimeFailure(message)
        };
        error!(error = %err, "Recording failed");
        // The platform recorder may keep the camera and microphone busy
        if !self.recorder_stopped {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.stop();
            }
        }
        self.teardown();
        self.state = RecordingState::Failed;
        self.last_error = Some(err);
    }

    /// Stop recording and assemble the file.
    ///
    /// Valid only while recording. Returns `NoDataRecorded` if nothing was
    /// buffered; either way the controller ends up `Idle` unless the
    /// recorder failed during the flush.
    pub async fn stop(&mut self) -> Result<MediaArtifact, RecordingError> {
        self.pump();
        if self.state == RecordingState::Failed {
            return Err(self
                .last_error
                .clone()
                .unwrap_or(RecordingError::InvalidState("stop")));
        }
        if self.state != RecordingState::Recording {
            return Err(RecordingError::InvalidState("stop"));
        }

        self.state = RecordingState::Stopping;
        info!("Stopping recording");
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.stop();
        }

        while !self.recorder_stopped {
            let Some(events) = self.events.as_mut() else {
                break;
            };
            let event = events.next().await;
            match event {
                Some(RecorderEvent::Error(message)) => {
                    self.fail(message);
                    return Err(self
                        .last_error
                        .clone()
                        .unwrap_or(RecordingError::InvalidState("stop")));
                }
                Some(event) => self.apply(event),
                None => self.recorder_stopped = true,
            }
        }

        let recorder_mime = self
            .recorder
            .as_ref()
            .map(|r| r.mime_type().to_string())
            .unwrap_or_default();
        let chunks = std::mem::take(&mut self.chunks);
        self.teardown();
        self.state = RecordingState::Idle;

        if chunks.is_empty() {
            warn!("Recording stopped without data");
            return Err(RecordingError::NoDataRecorded);
        }

        let mime_type = if !self.requested_mime.is_empty() {
            self.requested_mime.clone()
        } else if !recorder_mime.is_empty() {
            recorder_mime
        } else {
            recording::FALLBACK_VIDEO_MIME.to_string()
        };
        let bytes = chunks.concat();
        let artifact = MediaArtifact {
            file_name: self
                .namer
                .file_name(ArtifactKind::Video, extension_for_mime(&mime_type)),
            mime_type,
            bytes,
            kind: ArtifactKind::Video,
        };
        info!(
            file = %artifact.file_name,
            mime = %artifact.mime_type,
            size = artifact.len(),
            chunks = chunks.len(),
            "Recording saved"
        );
        Ok(artifact)
    }

    /// Stop without saving; buffered data is discarded
    pub fn abort(&mut self) {
        if self.state == RecordingState::Idle {
            return;
        }
        info!(state = ?self.state, "Aborting recording");
        if !self.recorder_stopped {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.stop();
            }
        }
        self.teardown();
        self.state = RecordingState::Idle;
    }

    fn reset(&mut self) {
        self.teardown();
        self.last_error = None;
        self.format = RecordingFormat::default();
        self.requested_mime.clear();
        self.state = RecordingState::Idle;
    }

    /// Drop recorder resources, buffered data and the elapsed counter
    fn teardown(&mut self) {
        self.stop_ticker();
        self.recorder = None;
        self.events = None;
        self.chunks.clear();
        self.recorder_stopped = false;
    }

    fn start_ticker(&mut self) {
        self.elapsed.send_replace(0);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, elapsed counter disabled");
            return;
        };
        let elapsed = Arc::clone(&self.elapsed);
        self.ticker = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(recording::ELAPSED_TICK);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                elapsed.send_modify(|seconds| *seconds += 1);
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::media::{AudioConstraints, MediaDevices, StreamConstraints};
    use crate::backends::virtual_media::{VirtualMediaDevices, VirtualRecorderFactory};

    async fn video_stream() -> Box<dyn MediaStream> {
        VirtualMediaDevices::default()
            .get_user_media(&StreamConstraints {
                audio: Some(AudioConstraints::default()),
                ..StreamConstraints::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_without_stream() {
        let factory = VirtualRecorderFactory::default();
        let mut controller = RecordingController::new(RecordingSettings::default(), ArtifactNamer::new());
        assert_eq!(
            controller.start(&factory, None),
            Err(RecordingError::NoStreamAvailable)
        );
        assert_eq!(controller.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_recording() {
        let stream = video_stream().await;
        let factory = VirtualRecorderFactory::default();
        let mut controller = RecordingController::new(RecordingSettings::default(), ArtifactNamer::new());
        controller.start(&factory, Some(stream.as_ref())).unwrap();
        assert_eq!(
            controller.start(&factory, Some(stream.as_ref())),
            Err(RecordingError::InvalidState("start"))
        );
        assert_eq!(controller.state(), RecordingState::Recording);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_invalid() {
        let mut controller = RecordingController::new(RecordingSettings::default(), ArtifactNamer::new());
        assert_eq!(controller.stop().await, Err(RecordingError::InvalidState("stop")));
    }

    #[tokio::test]
    async fn test_bitrate_and_timeslice_reach_recorder() {
        let stream = video_stream().await;
        let factory = VirtualRecorderFactory::default();
        let mut controller = RecordingController::new(RecordingSettings::default(), ArtifactNamer::new());
        controller.start(&factory, Some(stream.as_ref())).unwrap();
        let handle = factory.last_recorder().unwrap();
        assert_eq!(handle.timeslice(), Some(Duration::from_millis(200)));
        assert_eq!(handle.bits_per_second(), Some(2_500_000));
    }

    #[tokio::test]
    async fn test_abort_discards_buffer() {
        let stream = video_stream().await;
        let factory = VirtualRecorderFactory::default();
        let mut controller = RecordingController::new(RecordingSettings::default(), ArtifactNamer::new());
        controller.start(&factory, Some(stream.as_ref())).unwrap();
        factory.last_recorder().unwrap().push_data(b"abc");
        controller.pump();
        assert_eq!(controller.buffered_chunks(), 1);

        controller.abort();
        assert_eq!(controller.state(), RecordingState::Idle);
        assert_eq!(controller.buffered_chunks(), 0);
        assert!(factory.last_recorder().unwrap().is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_counter_ticks_each_second() {
        let stream = video_stream().await;
        let factory = VirtualRecorderFactory::default();
        let mut controller = RecordingController::new(RecordingSettings::default(), ArtifactNamer::new());
        controller.start(&factory, Some(stream.as_ref())).unwrap();
        let mut elapsed = controller.subscribe_elapsed();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(elapsed.has_changed().unwrap());
        assert_eq!(*elapsed.borrow_and_update(), 3);
    }
}
