// SPDX-License-Identifier: GPL-3.0-only

//! Sticker object model

use crate::canvas::{Color, FontSet, FontSpec, Point};
use crate::constants::sticker as metrics;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable sticker identifier, unique for the object's lifetime
pub type StickerId = Uuid;

/// Kind-specific sticker payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StickerKind {
    /// A single emoji glyph
    Emoji { glyph: String },
    /// Text on a rounded pill
    Label {
        text: String,
        background: Color,
        color: Color,
    },
    /// Styled text with no background
    Text { text: String, color: Color },
}

/// A placed sticker; all geometry is in authoring space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerObject {
    pub id: StickerId,
    #[serde(flatten)]
    pub kind: StickerKind,
    /// Center of the sticker
    pub position: Point,
    pub scale: f32,
    pub rotation_degrees: f32,
}

/// Clamp and step rules for direct manipulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerLimits {
    pub min_scale: f32,
    pub max_scale: f32,
    pub scale_step: f32,
    pub rotation_step: f32,
}

impl Default for StickerLimits {
    fn default() -> Self {
        Self {
            min_scale: metrics::MIN_SCALE,
            max_scale: metrics::MAX_SCALE,
            scale_step: metrics::SCALE_STEP,
            rotation_step: metrics::ROTATION_STEP_DEGREES,
        }
    }
}

impl StickerLimits {
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Wrap an angle into [0, 360)
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

impl StickerKind {
    pub fn emoji(glyph: impl Into<String>) -> Self {
        StickerKind::Emoji {
            glyph: glyph.into(),
        }
    }

    pub fn label(text: impl Into<String>, background: Color, color: Color) -> Self {
        StickerKind::Label {
            text: text.into(),
            background,
            color,
        }
    }

    pub fn text(text: impl Into<String>, color: Color) -> Self {
        StickerKind::Text {
            text: text.into(),
            color,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StickerKind::Emoji { .. } => "emoji",
            StickerKind::Label { .. } => "label",
            StickerKind::Text { .. } => "text",
        }
    }

    /// Font used for the sticker's text at combined scale `s`
    pub fn font(&self, s: f32) -> FontSpec {
        match self {
            StickerKind::Emoji { .. } => FontSpec::emoji(metrics::EMOJI_FONT_PX * s),
            StickerKind::Label { .. } => FontSpec::bold(metrics::LABEL_FONT_PX * s),
            StickerKind::Text { .. } => FontSpec::bold(metrics::TEXT_FONT_PX * s),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            StickerKind::Emoji { glyph } => glyph,
            StickerKind::Label { text, .. } | StickerKind::Text { text, .. } => text,
        }
    }

    /// Half width and half height of the unrotated sticker at combined
    /// scale `s`, measured with the faces the raster draws with
    pub fn half_extents(&self, s: f32, fonts: &FontSet) -> (f32, f32) {
        let font = self.font(s);
        let text_width = fonts.measure(self.content(), &font);
        match self {
            StickerKind::Emoji { .. } | StickerKind::Text { .. } => {
                (text_width / 2.0, font.size_px / 2.0)
            }
            StickerKind::Label { .. } => {
                let (width, height) = label_box(text_width, s);
                (width / 2.0, height / 2.0)
            }
        }
    }
}

/// Pill size for a label whose text measures `text_width` at combined scale `s`
pub fn label_box(text_width: f32, s: f32) -> (f32, f32) {
    let pad = metrics::LABEL_PADDING * s;
    (
        text_width + pad * 2.0,
        metrics::LABEL_BOX_HEIGHT * s + pad,
    )
}

impl StickerObject {
    /// New object at `position` with scale 1 and no rotation
    pub fn new(kind: StickerKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            scale: 1.0,
            rotation_degrees: 0.0,
        }
    }

    /// True when an authoring-space point falls inside the rotated bounds
    pub fn contains(&self, point: Point, fonts: &FontSet) -> bool {
        let (half_w, half_h) = self.kind.half_extents(self.scale, fonts);
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        // Undo the sticker rotation
        let (sin, cos) = (-self.rotation_degrees.to_radians()).sin_cos();
        let local_x = dx * cos - dy * sin;
        let local_y = dx * sin + dy * cos;
        local_x.abs() <= half_w && local_y.abs() <= half_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!(wrap_degrees(-1e-7) < 360.0);
    }

    #[test]
    fn test_kind_serializes_with_tag() {
        let kind = StickerKind::label("SALE", Color::rgb(0xef, 0x44, 0x44), Color::WHITE);
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "label");
        assert_eq!(json["background"], "#ef4444");
    }

    #[test]
    fn test_label_box_grows_with_scale() {
        let (w1, h1) = label_box(100.0, 1.0);
        assert_eq!((w1, h1), (132.0, 76.0));
        let (_, h2) = label_box(200.0, 2.0);
        assert_eq!(h2, 152.0);
    }

    #[test]
    fn test_contains_respects_rotation() {
        let fonts = FontSet::default();
        let mut obj = StickerObject::new(StickerKind::text("WIDE TEXT", Color::WHITE), Point::new(500.0, 500.0));
        let (half_w, _) = obj.kind.half_extents(1.0, &fonts);
        let beside = Point::new(500.0 + half_w - 5.0, 500.0);
        assert!(obj.contains(beside, &fonts));
        obj.rotation_degrees = 90.0;
        assert!(!obj.contains(beside, &fonts));
        assert!(obj.contains(Point::new(500.0, 500.0 + half_w - 5.0), &fonts));
    }

    #[test]
    fn test_extents_follow_glyph_advances() {
        let fonts = FontSet::default();
        let narrow = StickerKind::text("iiiiiiii", Color::WHITE).half_extents(1.0, &fonts);
        let wide = StickerKind::text("WWWWWWWW", Color::WHITE).half_extents(1.0, &fonts);
        // Same character count, very different drawn widths
        assert!(wide.0 > narrow.0 * 2.0);
        let font = FontSpec::bold(metrics::TEXT_FONT_PX);
        assert_eq!(wide.0, fonts.measure("WWWWWWWW", &font) / 2.0);
    }

    #[test]
    fn test_bad_color_in_json_is_an_error() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","kind":"text","text":"Hi","color":"aé123","position":{"x":1.0,"y":2.0},"scale":1.0,"rotation_degrees":0.0}"#;
        let result = serde_json::from_str::<StickerObject>(json);
        assert!(result.is_err());
        let ok = json.replace("aé123", "#ffffff");
        assert!(serde_json::from_str::<StickerObject>(&ok).is_ok());
    }
}
