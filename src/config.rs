// SPDX-License-Identifier: GPL-3.0-only

//! Studio configuration
//!
//! Stored as JSON at `<config dir>/promo-studio/config.json`. Every field has
//! a default, so a missing file or a partial file both load cleanly.

use crate::backends::media::{AudioConstraints, CaptureMode, Facing, StreamConstraints};
use crate::constants::{self, BitratePreset, capture};
use crate::errors::{AppError, AppResult};
use crate::pipelines::video::RecordingSettings;
use crate::stickers::StickerLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Requested camera constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub facing: Facing,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: capture::DEFAULT_WIDTH,
            height: capture::DEFAULT_HEIGHT,
            frame_rate: capture::DEFAULT_FRAME_RATE,
            facing: Facing::Front,
        }
    }
}

/// Canonical export target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    /// TTF/OTF face for sticker text; the bundled DejaVu Sans Bold when unset
    pub font_path: Option<PathBuf>,
    /// Outline emoji face tried before the text face for emoji stickers
    pub emoji_font_path: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: constants::EXPORT_WIDTH,
            height: constants::EXPORT_HEIGHT,
            font_path: None,
            emoji_font_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub timeslice_ms: u64,
    pub bitrate_preset: BitratePreset,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            timeslice_ms: constants::recording::TIMESLICE.as_millis() as u64,
            bitrate_preset: BitratePreset::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub video: VideoSettings,
    pub audio: AudioConstraints,
    pub export: ExportSettings,
    pub stickers: StickerLimits,
    pub recording: RecordingConfig,
    /// Mirror the front camera in preview and export
    pub mirror_front_camera: bool,
    /// Give up on a permission prompt after this long; `None` waits forever
    pub permission_timeout_ms: Option<u64>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            video: VideoSettings::default(),
            audio: AudioConstraints::default(),
            export: ExportSettings::default(),
            stickers: StickerLimits::default(),
            recording: RecordingConfig::default(),
            mirror_front_camera: true,
            permission_timeout_ms: None,
        }
    }
}

impl StudioConfig {
    /// `<config dir>/promo-studio/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("promo-studio").join("config.json"))
    }

    /// Load from the default path, falling back to defaults when there is
    /// no config directory or no file
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields defaults, a malformed one an
    /// `AppError::Config`
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_json(text: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Reject values no session could work with
    pub fn validate(&self) -> AppResult<()> {
        let fail = |msg: &str| Err(AppError::Config(msg.to_string()));
        if self.video.width == 0 || self.video.height == 0 || self.video.frame_rate == 0 {
            return fail("video width, height and frame_rate must be positive");
        }
        if self.export.width == 0 || self.export.height == 0 {
            return fail("export width and height must be positive");
        }
        let limits = &self.stickers;
        if !(limits.min_scale > 0.0 && limits.min_scale <= limits.max_scale) {
            return fail("sticker min_scale must be positive and not above max_scale");
        }
        if limits.scale_step <= 0.0 || limits.rotation_step <= 0.0 {
            return fail("sticker steps must be positive");
        }
        if self.recording.timeslice_ms == 0 {
            return fail("recording timeslice_ms must be positive");
        }
        if self.permission_timeout_ms == Some(0) {
            return fail("permission_timeout_ms must be positive when set");
        }
        Ok(())
    }

    /// Stream request for a capture mode; audio only in video mode
    pub fn stream_constraints(&self, mode: CaptureMode, facing: Facing) -> StreamConstraints {
        StreamConstraints {
            width: self.video.width,
            height: self.video.height,
            frame_rate: self.video.frame_rate,
            facing,
            device_id: None,
            audio: match mode {
                CaptureMode::Photo => None,
                CaptureMode::Video => Some(self.audio),
            },
        }
    }

    pub fn recording_settings(&self) -> RecordingSettings {
        RecordingSettings {
            timeslice: Duration::from_millis(self.recording.timeslice_ms),
            bitrate: self.recording.bitrate_preset,
            width: self.video.width,
            height: self.video.height,
        }
    }

    pub fn permission_timeout(&self) -> Option<Duration> {
        constants::millis(self.permission_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = StudioConfig::from_json(r#"{ "video": { "facing": "back" } }"#).unwrap();
        assert_eq!(config.video.facing, Facing::Back);
        assert_eq!(config.video.width, 1080);
        assert!(config.mirror_front_camera);
        assert_eq!(config.recording.timeslice_ms, 200);
    }

    #[test]
    fn test_inverted_scale_range_rejected() {
        let result = StudioConfig::from_json(r#"{ "stickers": { "min_scale": 5.0, "max_scale": 1.0 } }"#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_audio_only_in_video_mode() {
        let config = StudioConfig::default();
        assert!(config.stream_constraints(CaptureMode::Photo, Facing::Front).audio.is_none());
        assert!(config.stream_constraints(CaptureMode::Video, Facing::Front).audio.is_some());
    }
}
