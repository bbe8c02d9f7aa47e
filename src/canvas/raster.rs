// SPDX-License-Identifier: GPL-3.0-only

//! Pixel canvas over an RGBA image
//!
//! Shapes are rasterized by inverse-mapping every target pixel in the shape's
//! bounding box back into local space, so rotated stickers have no gaps.
//! Text goes through `ab_glyph` with the canvas's [`FontSet`]; glyph coverage
//! is first rendered into a local mask and then composited through the same
//! inverse mapping. Characters no face can draw are collected and turn
//! [`finish`](RasterCanvas::finish) into an error.

use super::fonts::Line;
use super::{Affine, Canvas2d, Color, FontSet, FontSpec, Point, TransformStack};
use ab_glyph::{Font, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::errors::PhotoError;

pub struct RasterCanvas {
    image: RgbaImage,
    stack: TransformStack,
    fonts: FontSet,
    missing: Vec<char>,
}

/// Glyph coverage for one line of text, in local units
struct TextMask {
    /// Local-space position of the mask's top-left corner relative to the anchor
    origin: Point,
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl RasterCanvas {
    /// Fully transparent canvas
    pub fn new(width: u32, height: u32, fonts: FontSet) -> Self {
        Self::from_image(RgbaImage::new(width, height), fonts)
    }

    /// Draw on top of an existing image (e.g. an already filtered frame)
    pub fn from_image(image: RgbaImage, fonts: FontSet) -> Self {
        Self {
            image,
            stack: TransformStack::default(),
            fonts,
            missing: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Characters that text fills could not draw so far
    pub fn missing_glyphs(&self) -> &[char] {
        &self.missing
    }

    /// The finished image, or `GlyphUnavailable` if any text was incomplete
    pub fn finish(self) -> Result<RgbaImage, PhotoError> {
        if self.missing.is_empty() {
            Ok(self.image)
        } else {
            Err(PhotoError::GlyphUnavailable(self.missing.into_iter().collect()))
        }
    }

    /// Device-space pixel range covered by a local rectangle under `transform`
    fn device_bounds(
        &self,
        transform: &Affine,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Option<(u32, u32, u32, u32)> {
        let corners = [
            transform.apply(Point::new(x, y)),
            transform.apply(Point::new(x + width, y)),
            transform.apply(Point::new(x, y + height)),
            transform.apply(Point::new(x + width, y + height)),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        let (w, h) = self.image.dimensions();
        if max_x < 0.0 || max_y < 0.0 || min_x >= w as f32 || min_y >= h as f32 {
            return None;
        }
        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil() as u32).min(w);
        let y1 = (max_y.ceil() as u32).min(h);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Source-over blend of `color` at `coverage` into one pixel
    fn blend(pixel: &mut Rgba<u8>, color: Color, coverage: f32) {
        let src_a = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst_a = pixel[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (channel, src_c) in src.iter().enumerate() {
            let s = *src_c as f32 / 255.0;
            let d = pixel[channel] as f32 / 255.0;
            let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            pixel[channel] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        pixel[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Signed distance from `p` to a rounded rectangle centered at the origin
    fn round_rect_distance(p: Point, half_w: f32, half_h: f32, radius: f32) -> f32 {
        let qx = p.x.abs() - (half_w - radius);
        let qy = p.y.abs() - (half_h - radius);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        let inside = qx.max(qy).min(0.0);
        outside + inside - radius
    }

    fn rasterize_line(fonts: &FontSet, line: &Line<'_>, font: &FontSpec) -> Option<TextMask> {
        let primary = fonts.primary(font.family)?;
        let scale = PxScale::from(font.size_px);
        let scaled = primary.as_scaled(scale);

        // Middle baseline: center the ascent..descent band on the anchor
        let start_x = -line.width / 2.0;
        let baseline = (scaled.ascent() + scaled.descent()) / 2.0;

        let outlines: Vec<_> = line
            .glyphs
            .iter()
            .filter_map(|glyph| {
                glyph.face.outline_glyph(
                    glyph
                        .id
                        .with_scale_and_position(scale, point(start_x + glyph.x, baseline)),
                )
            })
            .collect();
        if outlines.is_empty() {
            return None;
        }

        let min_x = outlines.iter().map(|o| o.px_bounds().min.x).fold(f32::INFINITY, f32::min).floor();
        let min_y = outlines.iter().map(|o| o.px_bounds().min.y).fold(f32::INFINITY, f32::min).floor();
        let max_x = outlines.iter().map(|o| o.px_bounds().max.x).fold(f32::NEG_INFINITY, f32::max).ceil();
        let max_y = outlines.iter().map(|o| o.px_bounds().max.y).fold(f32::NEG_INFINITY, f32::max).ceil();

        let width = (max_x - min_x).max(1.0) as u32;
        let height = (max_y - min_y).max(1.0) as u32;
        let mut coverage = vec![0.0f32; (width * height) as usize];

        for outline in &outlines {
            let bounds = outline.px_bounds();
            let ox = (bounds.min.x - min_x) as i64;
            let oy = (bounds.min.y - min_y) as i64;
            outline.draw(|gx, gy, c| {
                let mx = ox + gx as i64;
                let my = oy + gy as i64;
                if mx >= 0 && my >= 0 && (mx as u32) < width && (my as u32) < height {
                    let idx = (my as u32 * width + mx as u32) as usize;
                    coverage[idx] = (coverage[idx] + c).min(1.0);
                }
            });
        }

        Some(TextMask {
            origin: Point::new(min_x, min_y),
            width,
            height,
            coverage,
        })
    }

    fn composite_mask(&mut self, mask: &TextMask, x: f32, y: f32, color: Color) {
        let transform = self.stack.current();
        let Some(inverse) = transform.invert() else {
            return;
        };
        let left = x + mask.origin.x;
        let top = y + mask.origin.y;
        let Some((x0, y0, x1, y1)) =
            self.device_bounds(&transform, left, top, mask.width as f32, mask.height as f32)
        else {
            return;
        };

        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.apply(Point::new(px as f32 + 0.5, py as f32 + 0.5));
                let u = (local.x - left).floor();
                let v = (local.y - top).floor();
                if u < 0.0 || v < 0.0 || u >= mask.width as f32 || v >= mask.height as f32 {
                    continue;
                }
                let c = mask.coverage[(v as u32 * mask.width + u as u32) as usize];
                if c > 0.0 {
                    Self::blend(self.image.get_pixel_mut(px, py), color, c);
                }
            }
        }
    }
}

impl Canvas2d for RasterCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn save(&mut self) {
        self.stack.save();
    }

    fn restore(&mut self) {
        self.stack.restore();
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.stack.translate(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.stack.rotate(radians);
    }

    fn fill_round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32, color: Color) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let transform = self.stack.current();
        let Some(inverse) = transform.invert() else {
            return;
        };
        let Some((x0, y0, x1, y1)) = self.device_bounds(&transform, x, y, width, height) else {
            return;
        };

        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let radius = radius.clamp(0.0, half_w.min(half_h));
        let center = Point::new(x + half_w, y + half_h);

        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.apply(Point::new(px as f32 + 0.5, py as f32 + 0.5));
                let rel = Point::new(local.x - center.x, local.y - center.y);
                let distance = Self::round_rect_distance(rel, half_w, half_h, radius);
                let coverage = (0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    Self::blend(self.image.get_pixel_mut(px, py), color, coverage);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: Color) {
        if text.is_empty() || font.size_px <= 0.0 {
            return;
        }
        let line = self.fonts.layout(text, font);
        if !line.missing.is_empty() {
            let missing: String = line.missing.iter().collect();
            warn!(text, %missing, "No loaded font has glyphs for sticker text");
            for c in &line.missing {
                if !self.missing.contains(c) {
                    self.missing.push(*c);
                }
            }
        }
        match Self::rasterize_line(&self.fonts, &line, font) {
            Some(mask) => self.composite_mask(&mask, x, y, color),
            None => debug!(text, "Nothing to rasterize for text"),
        }
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        self.fonts.measure(text, font)
    }
}
