// SPDX-License-Identifier: GPL-3.0-only

//! One camera engagement
//!
//! A [`CaptureSession`] owns the only live stream (through its
//! [`DeviceNegotiator`]), the sticker layer, the selected filter and mode,
//! and the recording controller. Two sessions never share state, so shells
//! and tests can run several side by side.

use crate::backends::media::{CaptureMode, DeviceNegotiator, Facing, MediaDevices, RecorderFactory};
use crate::canvas::FontSet;
use crate::config::StudioConfig;
use crate::errors::{AppResult, RecordingError};
use crate::filters::FilterPreset;
use crate::pipelines::photo::PhotoPipeline;
use crate::pipelines::video::{RecordingController, RecordingState};
use crate::stickers::StickerLayer;
use crate::storage::{ArtifactNamer, MediaArtifact};
use tracing::{debug, info, warn};

pub struct CaptureSession<D: MediaDevices, R: RecorderFactory> {
    negotiator: DeviceNegotiator<D>,
    recorders: R,
    stickers: StickerLayer,
    filter: FilterPreset,
    mode: CaptureMode,
    facing: Facing,
    recording: RecordingController,
    config: StudioConfig,
    namer: ArtifactNamer,
}

impl<D: MediaDevices, R: RecorderFactory> CaptureSession<D, R> {
    /// Build a session; no stream is opened until [`open`](Self::open).
    ///
    /// Fails when the configuration is invalid or a configured font cannot be
    /// loaded.
    pub fn new(devices: D, recorders: R, config: StudioConfig) -> AppResult<Self> {
        config.validate()?;
        let fonts = FontSet::load(
            config.export.font_path.as_deref(),
            config.export.emoji_font_path.as_deref(),
        )?;
        let namer = ArtifactNamer::new();
        Ok(Self {
            negotiator: DeviceNegotiator::new(devices)
                .with_permission_timeout(config.permission_timeout()),
            recorders,
            stickers: StickerLayer::new(config.stickers).with_fonts(fonts),
            filter: FilterPreset::None,
            mode: CaptureMode::Photo,
            facing: config.video.facing,
            recording: RecordingController::new(config.recording_settings(), namer.clone()),
            config,
            namer,
        })
    }

    /// Open (or reopen) the stream for the current mode and facing
    pub async fn open(&mut self) -> AppResult<()> {
        let mut constraints = self.config.stream_constraints(self.mode, self.facing);
        constraints.device_id = self.negotiator.constraints().device_id.clone();
        self.negotiator.open(constraints).await?;

        if self.negotiator.known_devices().is_empty() {
            if let Err(e) = self.negotiator.enumerate_devices().await {
                warn!(error = %e, "Device enumeration failed");
            }
        }
        info!(
            mode = %self.mode,
            facing = %self.facing,
            can_switch = self.negotiator.can_switch(),
            "Capture session open"
        );
        Ok(())
    }

    /// Abort any recording and release the stream
    pub fn close(&mut self) {
        self.recording.abort();
        self.negotiator.close();
        debug!("Capture session closed");
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Switch between photo and video.
    ///
    /// An open stream is reopened because video mode also requests audio.
    pub async fn set_mode(&mut self, mode: CaptureMode) -> AppResult<()> {
        if self.recording.is_active() {
            warn!(requested = %mode, "Mode change rejected while recording");
            return Err(RecordingError::ModeLocked.into());
        }
        if mode == self.mode {
            return Ok(());
        }
        info!(from = %self.mode, to = %mode, "Switching capture mode");
        self.mode = mode;
        if self.negotiator.has_stream() {
            self.open().await?;
        }
        Ok(())
    }

    pub fn filter(&self) -> FilterPreset {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterPreset) {
        debug!(filter = %filter, "Filter selected");
        self.filter = filter;
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn can_switch(&self) -> bool {
        self.negotiator.can_switch()
    }

    /// Reopen on the other camera. `Ok(false)` when there is only one.
    pub async fn switch_facing(&mut self) -> AppResult<bool> {
        if self.recording.is_active() {
            warn!("Camera switch rejected while recording");
            return Err(RecordingError::ModeLocked.into());
        }
        let switched = self.negotiator.switch_facing().await?;
        if switched {
            self.facing = self.negotiator.facing();
        }
        Ok(switched)
    }

    pub async fn probe_permission(&mut self) -> AppResult<()> {
        Ok(self.negotiator.probe_permission().await?)
    }

    /// Front camera output is mirrored when enabled in config
    pub fn is_mirrored(&self) -> bool {
        self.config.mirror_front_camera && self.facing == Facing::Front
    }

    /// CSS filter string for the live preview element
    pub fn preview_css(&self) -> String {
        self.filter.css()
    }

    /// Track the preview container size; see [`StickerLayer::resize`]
    pub fn resize_viewport(&mut self, width: f32, height: f32) -> bool {
        self.stickers.resize(width, height)
    }

    pub fn stickers(&self) -> &StickerLayer {
        &self.stickers
    }

    pub fn stickers_mut(&mut self) -> &mut StickerLayer {
        &mut self.stickers
    }

    fn photo_pipeline(&self) -> PhotoPipeline {
        PhotoPipeline::new(self.config.export.width, self.config.export.height)
            .with_filter(self.filter)
            .with_mirror(self.is_mirrored())
            .with_fonts(self.stickers.fonts().clone())
    }

    /// Flatten the current frame, filter and stickers into a PNG
    pub async fn capture_photo(&self) -> AppResult<MediaArtifact> {
        let frame = self.negotiator.current_frame();
        let artifact = self
            .photo_pipeline()
            .capture(frame, Some(&self.stickers), &self.namer)
            .await?;
        Ok(artifact)
    }

    /// Stickers alone at export size on a transparent background
    pub fn export_overlay_png(&self) -> AppResult<Vec<u8>> {
        let (width, height) = (self.config.export.width, self.config.export.height);
        Ok(self.stickers.export_overlay_png(width, height)?)
    }

    pub fn start_recording(&mut self) -> AppResult<()> {
        self.recording
            .start(&self.recorders, self.negotiator.stream())?;
        Ok(())
    }

    /// Apply recorder events that have already arrived
    pub fn pump_recording(&mut self) -> RecordingState {
        self.recording.pump();
        self.recording.state()
    }

    pub async fn stop_recording(&mut self) -> AppResult<MediaArtifact> {
        Ok(self.recording.stop().await?)
    }

    pub fn recording(&self) -> &RecordingController {
        &self.recording
    }

    /// For shells that await [`RecordingController::next_event`]
    pub fn recording_mut(&mut self) -> &mut RecordingController {
        &mut self.recording
    }

    pub fn negotiator(&self) -> &DeviceNegotiator<D> {
        &self.negotiator
    }

    pub fn devices(&self) -> &D {
        self.negotiator.devices()
    }

    pub fn recorders(&self) -> &R {
        &self.recorders
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_media::{VirtualMediaDevices, VirtualRecorderFactory};
    use crate::errors::AppError;

    fn session() -> CaptureSession<VirtualMediaDevices, VirtualRecorderFactory> {
        CaptureSession::new(
            VirtualMediaDevices::default(),
            VirtualRecorderFactory::default(),
            StudioConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_video_mode_reopens_with_audio() {
        let mut session = session();
        session.open().await.unwrap();
        assert_eq!(session.negotiator().stream().unwrap().audio_track_count(), 0);

        session.set_mode(CaptureMode::Video).await.unwrap();
        assert_eq!(session.negotiator().stream().unwrap().audio_track_count(), 1);
        assert_eq!(session.devices().acquisitions(), 2);
        assert_eq!(session.devices().max_concurrent_streams(), 1);
    }

    #[tokio::test]
    async fn test_mode_locked_while_recording() {
        let mut session = session();
        session.set_mode(CaptureMode::Video).await.unwrap();
        session.open().await.unwrap();
        session.start_recording().unwrap();

        let err = session.set_mode(CaptureMode::Photo).await.unwrap_err();
        assert_eq!(err, AppError::Recording(RecordingError::ModeLocked));
        assert_eq!(session.mode(), CaptureMode::Video);
    }

    #[tokio::test]
    async fn test_close_aborts_recording() {
        let mut session = session();
        session.open().await.unwrap();
        session.start_recording().unwrap();
        session.close();
        assert_eq!(session.recording().state(), RecordingState::Idle);
        assert!(!session.negotiator().has_stream());
        assert_eq!(session.devices().open_streams(), 0);
    }

    #[test]
    fn test_bad_font_path_fails_construction() {
        let mut config = StudioConfig::default();
        config.export.emoji_font_path = Some("/nonexistent/emoji.ttf".into());
        let result = CaptureSession::new(
            VirtualMediaDevices::default(),
            VirtualRecorderFactory::default(),
            config,
        );
        assert!(matches!(
            result.err(),
            Some(AppError::Photo(crate::errors::PhotoError::FontUnavailable(_)))
        ));
    }

    #[test]
    fn test_mirroring_follows_facing_and_config() {
        let session = session();
        assert!(session.is_mirrored());

        let mut config = StudioConfig::default();
        config.mirror_front_camera = false;
        let session = CaptureSession::new(
            VirtualMediaDevices::default(),
            VirtualRecorderFactory::default(),
            config,
        )
        .unwrap();
        assert!(!session.is_mirrored());
    }
}
