// SPDX-License-Identifier: GPL-3.0-only

//! Named visual filter presets
//!
//! Each preset is a short chain of CSS filter primitives. The live preview
//! gets the chain as a CSS `filter` string; exported photos get the same
//! chain applied per pixel with the matrices from the Filter Effects spec,
//! so preview and export share one recipe.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Named filter preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPreset {
    /// No adjustment
    #[default]
    None,
    /// Black & white
    Bw,
    /// Light sepia with a contrast lift
    Vintage,
    /// Slightly saturated, hue pushed toward blue
    Cool,
    /// Slightly saturated, hue pushed toward amber
    Warm,
    /// Strong saturation boost
    Vibrant,
}

/// One CSS filter primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    HueRotate(f32),
    Contrast(f32),
    Brightness(f32),
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::None,
        FilterPreset::Bw,
        FilterPreset::Vintage,
        FilterPreset::Cool,
        FilterPreset::Warm,
        FilterPreset::Vibrant,
    ];

    /// Stable identifier used by the UI and in config
    pub fn id(&self) -> &'static str {
        match self {
            FilterPreset::None => "none",
            FilterPreset::Bw => "bw",
            FilterPreset::Vintage => "vintage",
            FilterPreset::Cool => "cool",
            FilterPreset::Warm => "warm",
            FilterPreset::Vibrant => "vibrant",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilterPreset::None => "Normal",
            FilterPreset::Bw => "B&W",
            FilterPreset::Vintage => "Vintage",
            FilterPreset::Cool => "Cool",
            FilterPreset::Warm => "Warm",
            FilterPreset::Vibrant => "Vibrant",
        }
    }

    pub fn ops(&self) -> &'static [FilterOp] {
        match self {
            FilterPreset::None => &[],
            FilterPreset::Bw => &[FilterOp::Grayscale(1.0), FilterOp::Contrast(1.05)],
            FilterPreset::Vintage => &[FilterOp::Sepia(0.3), FilterOp::Contrast(1.1)],
            FilterPreset::Cool => &[FilterOp::Saturate(1.2), FilterOp::HueRotate(10.0)],
            FilterPreset::Warm => &[FilterOp::Saturate(1.1), FilterOp::HueRotate(-10.0)],
            FilterPreset::Vibrant => &[FilterOp::Saturate(1.35), FilterOp::Contrast(1.06)],
        }
    }

    /// CSS `filter` value for the live preview (empty for none)
    pub fn css(&self) -> String {
        self.ops()
            .iter()
            .map(FilterOp::css)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Apply the preset to every pixel in place; alpha is untouched
    pub fn apply(&self, image: &mut RgbaImage) {
        let ops = self.ops();
        if ops.is_empty() {
            return;
        }
        debug!(filter = self.id(), width = image.width(), height = image.height(), "Applying filter");

        for pixel in image.pixels_mut() {
            let mut rgb = [
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            ];
            for op in ops {
                rgb = op.apply(rgb);
            }
            pixel[0] = (rgb[0] * 255.0).round() as u8;
            pixel[1] = (rgb[1] * 255.0).round() as u8;
            pixel[2] = (rgb[2] * 255.0).round() as u8;
        }
    }
}

impl FilterOp {
    pub fn css(&self) -> String {
        match self {
            FilterOp::Grayscale(v) => format!("grayscale({})", v),
            FilterOp::Sepia(v) => format!("sepia({})", v),
            FilterOp::Saturate(v) => format!("saturate({})", v),
            FilterOp::HueRotate(deg) => format!("hue-rotate({}deg)", deg),
            FilterOp::Contrast(v) => format!("contrast({})", v),
            FilterOp::Brightness(v) => format!("brightness({})", v),
        }
    }

    /// Apply to normalized RGB; the result is clamped to [0, 1] like each
    /// step of a CSS filter chain
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            FilterOp::Grayscale(amount) => {
                let s = 1.0 - amount.clamp(0.0, 1.0);
                mul(
                    &[
                        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
                        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
                        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
                    ],
                    rgb,
                )
            }
            FilterOp::Sepia(amount) => {
                let s = 1.0 - amount.clamp(0.0, 1.0);
                mul(
                    &[
                        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
                        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
                        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
                    ],
                    rgb,
                )
            }
            FilterOp::Saturate(s) => mul(
                &[
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ],
                rgb,
            ),
            FilterOp::HueRotate(degrees) => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                mul(
                    &[
                        [
                            0.213 + cos * 0.787 - sin * 0.213,
                            0.715 - cos * 0.715 - sin * 0.715,
                            0.072 - cos * 0.072 + sin * 0.928,
                        ],
                        [
                            0.213 - cos * 0.213 + sin * 0.143,
                            0.715 + cos * 0.285 + sin * 0.140,
                            0.072 - cos * 0.072 - sin * 0.283,
                        ],
                        [
                            0.213 - cos * 0.213 - sin * 0.787,
                            0.715 - cos * 0.715 + sin * 0.715,
                            0.072 + cos * 0.928 + sin * 0.072,
                        ],
                    ],
                    rgb,
                )
            }
            FilterOp::Contrast(c) => rgb.map(|v| (v - 0.5) * c + 0.5),
            FilterOp::Brightness(b) => rgb.map(|v| v * b),
        };
        out.map(|v| v.clamp(0.0, 1.0))
    }
}

fn mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for FilterPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterPreset::ALL
            .into_iter()
            .find(|preset| preset.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown filter preset: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_css_strings_match_preview() {
        assert_eq!(FilterPreset::None.css(), "");
        assert_eq!(FilterPreset::Bw.css(), "grayscale(1) contrast(1.05)");
        assert_eq!(FilterPreset::Cool.css(), "saturate(1.2) hue-rotate(10deg)");
        assert_eq!(FilterPreset::Warm.css(), "saturate(1.1) hue-rotate(-10deg)");
    }

    #[test]
    fn test_bw_removes_color() {
        let mut image = RgbaImage::from_pixel(2, 2, Rgba([200, 40, 90, 255]));
        FilterPreset::Bw.apply(&mut image);
        let p = image.get_pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_none_is_identity() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 78]));
        FilterPreset::None.apply(&mut image);
        assert_eq!(image.get_pixel(0, 0).0, [12, 34, 56, 78]);
    }

    #[test]
    fn test_gray_is_fixed_point_of_saturate_and_hue() {
        let gray = [0.5, 0.5, 0.5];
        for op in [FilterOp::Saturate(1.35), FilterOp::HueRotate(10.0)] {
            let out = op.apply(gray);
            for v in out {
                assert!((v - 0.5).abs() < 1e-3, "{:?} moved gray to {:?}", op, out);
            }
        }
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!("vintage".parse::<FilterPreset>(), Ok(FilterPreset::Vintage));
        assert!("sparkle".parse::<FilterPreset>().is_err());
    }
}
