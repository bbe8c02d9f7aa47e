// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use promo_studio::constants::{self, BitratePreset};

#[test]
fn test_bitrate_preset_values() {
    assert_eq!(BitratePreset::ALL.len(), 3);
}

#[test]
fn test_bitrate_preset_ordering() {
    // Presets are ordered from lowest to highest quality
    let mut prev_bitrate = 0u32;
    for preset in BitratePreset::ALL {
        let bitrate = preset.bits_per_second(1080, 1920);
        assert!(
            bitrate >= prev_bitrate,
            "Presets should be ordered from lowest to highest"
        );
        prev_bitrate = bitrate;
    }
}

#[test]
fn test_bitrate_scales_with_resolution() {
    let sd = BitratePreset::Medium.bits_per_second(480, 640);
    let hd = BitratePreset::Medium.bits_per_second(720, 1280);
    let fhd = BitratePreset::Medium.bits_per_second(1080, 1920);
    let uhd = BitratePreset::Medium.bits_per_second(2160, 3840);

    assert!(sd < hd);
    assert!(hd < fhd);
    assert!(fhd < uhd);
}

#[test]
fn test_bitrate_preset_display_names() {
    for preset in BitratePreset::ALL {
        assert!(!preset.display_name().is_empty());
    }
}

#[test]
fn test_export_matches_authoring_space() {
    assert_eq!(constants::EXPORT_WIDTH as f32, constants::AUTHORING_WIDTH);
    assert_eq!(constants::EXPORT_HEIGHT as f32, constants::AUTHORING_HEIGHT);
}

#[test]
fn test_elapsed_format() {
    assert_eq!(constants::format_elapsed(75), "1:15");
}

#[test]
fn test_app_version_present() {
    assert!(!constants::app_version().is_empty());
}
