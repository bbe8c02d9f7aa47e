// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the capture core
//!
//! Every error here is a local, recoverable condition. Callers match on the
//! variant to pick a message and a retry affordance; nothing unwinds past the
//! capture session.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Camera/microphone access errors
    Device(DeviceError),
    /// Video recording errors
    Recording(RecordingError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Configuration errors
    Config(String),
    /// Storage/upload errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera and microphone access errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The platform or the user denied camera access
    PermissionDenied,
    /// No usable camera, or the requested one could not be opened
    DeviceUnavailable(String),
    /// The permission request did not resolve within the configured timeout
    PermissionTimeout,
    /// The backend refused a second concurrent stream
    StreamInUse,
}

/// Video recording errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// No active camera stream to record from
    NoStreamAvailable,
    /// The active stream carries no video track
    NoVideoTrack,
    /// Every recorder construction attempt failed
    RecorderUnavailable(String),
    /// Recording stopped before any data arrived
    NoDataRecorded,
    /// Audio codec or audio track failure during recording
    AudioCodecFailure(String),
    /// Any other failure reported by the recorder while running
    RuntimeFailure(String),
    /// Operation not valid in the controller's current state
    InvalidState(&'static str),
    /// Mode or camera changes are not allowed while recording
    ModeLocked,
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// No video frame available for capture
    NoFrameAvailable,
    /// PNG encoding failed
    EncodingFailed(String),
    /// Loading the export font failed
    FontUnavailable(String),
    /// Sticker text contains characters no loaded font can draw
    GlyphUnavailable(String),
}

impl DeviceError {
    /// True when a plain retry may succeed; false when the user has to act
    /// outside the app first (grant permission, plug in a camera)
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeviceError::PermissionTimeout | DeviceError::StreamInUse)
    }

    /// Message for the persistent error banner
    pub fn user_message(&self) -> String {
        match self {
            DeviceError::PermissionDenied => {
                "Camera permission denied. Please allow camera access.".to_string()
            }
            DeviceError::DeviceUnavailable(_) => {
                "Failed to access camera. Please check your camera connection.".to_string()
            }
            DeviceError::PermissionTimeout => {
                "Waiting for camera permission timed out. Please try again.".to_string()
            }
            DeviceError::StreamInUse => {
                "The camera is busy. Please try again in a moment.".to_string()
            }
        }
    }
}

impl RecordingError {
    /// Message shown next to the record button
    pub fn user_message(&self) -> String {
        match self {
            RecordingError::NoStreamAvailable => "No camera stream available".to_string(),
            RecordingError::NoVideoTrack => "No video track available".to_string(),
            RecordingError::RecorderUnavailable(_) => {
                "Video recording not supported in this browser".to_string()
            }
            RecordingError::NoDataRecorded => "No video data recorded".to_string(),
            RecordingError::AudioCodecFailure(_) => {
                "Audio recording not supported. Recording video only.".to_string()
            }
            RecordingError::RuntimeFailure(msg) => format!("Recording error: {}", msg),
            RecordingError::InvalidState(_) => "Recording is not ready yet".to_string(),
            RecordingError::ModeLocked => "Not available while recording".to_string(),
        }
    }
}

impl PhotoError {
    pub fn user_message(&self) -> String {
        match self {
            PhotoError::NoFrameAvailable => "Photo capture failed. Please try again.".to_string(),
            PhotoError::EncodingFailed(_) => "Photo capture failed. Please try again.".to_string(),
            PhotoError::FontUnavailable(_) => "Sticker font could not be loaded.".to_string(),
            PhotoError::GlyphUnavailable(chars) => {
                format!("These stickers cannot be exported with the installed fonts: {}", chars)
            }
        }
    }
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Device(e) => e.user_message(),
            AppError::Recording(e) => e.user_message(),
            AppError::Photo(e) => e.user_message(),
            AppError::Config(_) => "Settings could not be loaded.".to_string(),
            AppError::Storage(_) => "Saving the capture failed. Please try again.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Device(e) => write!(f, "Device error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::PermissionDenied => write!(f, "Camera permission denied"),
            DeviceError::DeviceUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            DeviceError::PermissionTimeout => write!(f, "Permission request timed out"),
            DeviceError::StreamInUse => write!(f, "Another stream is still open"),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::NoStreamAvailable => write!(f, "No stream available"),
            RecordingError::NoVideoTrack => write!(f, "Stream has no video track"),
            RecordingError::RecorderUnavailable(msg) => write!(f, "Recorder unavailable: {}", msg),
            RecordingError::NoDataRecorded => write!(f, "No data recorded"),
            RecordingError::AudioCodecFailure(msg) => write!(f, "Audio codec failure: {}", msg),
            RecordingError::RuntimeFailure(msg) => write!(f, "Recorder failure: {}", msg),
            RecordingError::InvalidState(op) => write!(f, "Invalid state for {}", op),
            RecordingError::ModeLocked => write!(f, "Recording in progress"),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::FontUnavailable(msg) => write!(f, "Font unavailable: {}", msg),
            PhotoError::GlyphUnavailable(chars) => write!(f, "No font has glyphs for: {}", chars),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DeviceError {}
impl std::error::Error for RecordingError {}
impl std::error::Error for PhotoError {}

impl From<DeviceError> for AppError {
    fn from(err: DeviceError) -> Self {
        AppError::Device(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_errors_need_user_action() {
        assert!(!DeviceError::PermissionDenied.is_retryable());
        assert!(!DeviceError::DeviceUnavailable("none".into()).is_retryable());
        assert!(DeviceError::StreamInUse.is_retryable());
    }

    #[test]
    fn test_audio_failure_message_differs_from_generic() {
        let audio = RecordingError::AudioCodecFailure("opus".into()).user_message();
        let generic = RecordingError::RuntimeFailure("boom".into()).user_message();
        assert_ne!(audio, generic);
        assert!(generic.contains("boom"));
    }

    #[test]
    fn test_conversion_wraps_variant() {
        let err: AppError = PhotoError::NoFrameAvailable.into();
        assert_eq!(err, AppError::Photo(PhotoError::NoFrameAvailable));
        assert_eq!(err.to_string(), "Photo error: No frame available for capture");
    }
}
