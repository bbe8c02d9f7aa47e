// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Width of the virtual authoring canvas that sticker geometry lives in
pub const AUTHORING_WIDTH: f32 = 1080.0;

/// Height of the virtual authoring canvas (9:16 portrait)
pub const AUTHORING_HEIGHT: f32 = 1920.0;

/// Canonical export target size in pixels (equal to the authoring space)
pub const EXPORT_WIDTH: u32 = 1080;
pub const EXPORT_HEIGHT: u32 = 1920;

/// Version string baked in by build.rs
pub fn app_version() -> &'static str {
    env!("STUDIO_BUILD_VERSION")
}

/// Recorder bitrate presets
///
/// The recorder is asked for a target bitrate that depends on the capture
/// resolution. Medium at a 1080-wide portrait stream gives 2.5 Mbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitratePreset {
    /// Low bitrate - smaller uploads, reduced quality
    Low,
    /// Medium bitrate - balanced quality and upload size (default)
    #[default]
    Medium,
    /// High bitrate - larger uploads, better quality
    High,
}

impl BitratePreset {
    /// All preset variants for UI iteration
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    /// Display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            BitratePreset::Low => "Low",
            BitratePreset::Medium => "Medium",
            BitratePreset::High => "High",
        }
    }

    /// Target bitrate in bits per second for a capture resolution
    pub fn bits_per_second(&self, width: u32, height: u32) -> u32 {
        match (ResolutionTier::for_size(width, height), self) {
            (ResolutionTier::SD, BitratePreset::Low) => 800_000,
            (ResolutionTier::SD, BitratePreset::Medium) => 1_200_000,
            (ResolutionTier::SD, BitratePreset::High) => 2_000_000,
            (ResolutionTier::HD, BitratePreset::Low) => 1_200_000,
            (ResolutionTier::HD, BitratePreset::Medium) => 1_800_000,
            (ResolutionTier::HD, BitratePreset::High) => 3_000_000,
            (ResolutionTier::FullHD, BitratePreset::Low) => 1_500_000,
            (ResolutionTier::FullHD, BitratePreset::Medium) => 2_500_000,
            (ResolutionTier::FullHD, BitratePreset::High) => 5_000_000,
            (ResolutionTier::UltraHD, BitratePreset::Low) => 4_000_000,
            (ResolutionTier::UltraHD, BitratePreset::Medium) => 8_000_000,
            (ResolutionTier::UltraHD, BitratePreset::High) => 16_000_000,
        }
    }
}

/// Resolution tiers for bitrate calculation, by pixel count so portrait and
/// landscape streams of the same size land in the same tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// Up to 640x640 worth of pixels
    SD,
    /// Up to 1280x720
    HD,
    /// Up to 1920x1080
    FullHD,
    /// Anything larger
    UltraHD,
}

impl ResolutionTier {
    pub fn for_size(width: u32, height: u32) -> Self {
        match width as u64 * height as u64 {
            p if p <= 409_600 => ResolutionTier::SD,
            p if p <= 921_600 => ResolutionTier::HD,
            p if p <= 2_073_600 => ResolutionTier::FullHD,
            _ => ResolutionTier::UltraHD,
        }
    }
}

/// Sticker geometry, in authoring pixels at sticker scale 1
pub mod sticker {
    /// Smallest allowed sticker scale
    pub const MIN_SCALE: f32 = 0.3;
    /// Largest allowed sticker scale
    pub const MAX_SCALE: f32 = 4.0;
    /// Scale change per +/- tap
    pub const SCALE_STEP: f32 = 0.1;
    /// Rotation change per rotate tap, in degrees
    pub const ROTATION_STEP_DEGREES: f32 = 10.0;

    /// Emoji glyph size
    pub const EMOJI_FONT_PX: f32 = 120.0;

    /// Label text size
    pub const LABEL_FONT_PX: f32 = 42.0;
    /// Horizontal padding on each side of a label, also added to its height
    pub const LABEL_PADDING: f32 = 16.0;
    /// Label pill height before padding
    pub const LABEL_BOX_HEIGHT: f32 = 60.0;
    /// Label pill corner radius
    pub const LABEL_CORNER_RADIUS: f32 = 14.0;
    /// Label text sits slightly below the pill center
    pub const LABEL_TEXT_OFFSET_Y: f32 = 2.0;

    /// Free text size
    pub const TEXT_FONT_PX: f32 = 54.0;

    /// Default label pill color
    pub const DEFAULT_LABEL_BACKGROUND: &str = "#111111";
    /// Default label and free text color
    pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";
}

/// Recording timing
pub mod recording {
    use std::time::Duration;

    /// Recorder data slice interval
    pub const TIMESLICE: Duration = Duration::from_millis(200);

    /// Elapsed-time counter resolution
    pub const ELAPSED_TICK: Duration = Duration::from_secs(1);

    /// MIME type used when neither the resolved format nor the recorder report one
    pub const FALLBACK_VIDEO_MIME: &str = "video/webm";
}

/// Default camera request
pub mod capture {
    pub const DEFAULT_WIDTH: u32 = 1080;
    pub const DEFAULT_HEIGHT: u32 = 1920;
    pub const DEFAULT_FRAME_RATE: u32 = 30;
}

/// Format elapsed recording time for the on-screen counter ("m:ss")
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Convert an optional millisecond setting into a Duration
pub fn millis(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_millis)
}
