// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for media device backends

use crate::constants::capture;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Logical camera direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// User-facing camera
    #[default]
    Front,
    /// Environment-facing camera
    Back,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    /// Positional fallback when device labels are hidden: the first camera
    /// approximates front, the second back
    pub fn positional_index(self) -> usize {
        match self {
            Facing::Front => 0,
            Facing::Back => 1,
        }
    }

    /// Whether a device label names this direction
    pub fn matches_label(self, label: &str) -> bool {
        let label = label.to_lowercase();
        let keywords: &[&str] = match self {
            Facing::Front => &["front", "user", "facetime", "selfie"],
            Facing::Back => &["back", "rear", "environment", "world"],
        };
        keywords.iter().any(|k| label.contains(k))
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

/// Photo or video capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Photo,
    Video,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Photo => write!(f, "photo"),
            CaptureMode::Video => write!(f, "video"),
        }
    }
}

/// Microphone processing requested alongside video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Everything a stream request asks for; backends treat sizes and rates
/// as ideals and fall back to their own defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub facing: Facing,
    /// Exact device to open; takes precedence over `facing`
    pub device_id: Option<String>,
    /// Present only in video mode
    pub audio: Option<AudioConstraints>,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: capture::DEFAULT_WIDTH,
            height: capture::DEFAULT_HEIGHT,
            frame_rate: capture::DEFAULT_FRAME_RATE,
            facing: Facing::Front,
            device_id: None,
            audio: None,
        }
    }
}

/// A video input as reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDeviceInfo {
    pub device_id: String,
    /// Empty until camera permission has been granted
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub kind: TrackKind,
    pub label: String,
}

/// One decoded preview frame, tightly packed RGBA
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
}

impl CameraFrame {
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: Arc::from(image.as_raw().as_slice()),
        }
    }

    /// False for empty frames or frames whose buffer does not match
    /// their dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * 4
    }

    /// Copy into an owned image; `None` if the frame is not valid
    pub fn to_image(&self) -> Option<RgbaImage> {
        if !self.is_valid() {
            return None;
        }
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_labels() {
        assert!(Facing::Front.matches_label("FaceTime HD Camera"));
        assert!(Facing::Back.matches_label("camera2 0, facing back"));
        assert!(Facing::Back.matches_label("Rear Camera"));
        assert!(!Facing::Front.matches_label("USB Camera"));
        assert_eq!(Facing::Front.opposite(), Facing::Back);
    }

    #[test]
    fn test_frame_validation() {
        let bad = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(vec![0u8; 15].as_slice()),
        };
        assert!(!bad.is_valid());
        assert!(bad.to_image().is_none());

        let good = CameraFrame::from_image(&RgbaImage::new(3, 1));
        assert!(good.is_valid());
        assert_eq!(good.to_image().map(|i| i.dimensions()), Some((3, 1)));
    }
}
