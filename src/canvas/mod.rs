// SPDX-License-Identifier: GPL-3.0-only

//! 2D drawing surface abstraction
//!
//! Sticker rendering is written against [`Canvas2d`], a small immediate-mode
//! API modelled on the browser's 2D context: a save/restore transform stack,
//! translate/rotate, rounded-rect fills and centered text.
//!
//! ```text
//! StickerLayer::render ──► Canvas2d ──┬──► RasterCanvas  (pixels, PNG export)
//!                                     └──► DisplayList   (recorded commands)
//! ```

pub mod display_list;
pub mod fonts;
pub mod raster;

pub use display_list::{DisplayList, DrawCommand};
pub use fonts::FontSet;
pub use raster::RasterCanvas;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in whatever space the caller is working in
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Non-premultiplied RGBA color, serialized as `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        // Channel slicing below is by byte
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Color::rgb(digits.next()??, digits.next()??, digits.next()??))
            }
            6 => Some(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Some(Color {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: channel(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// 2D affine transform in canvas convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(dx: f32, dy: f32) -> Self {
        Affine {
            e: dx,
            f: dy,
            ..Affine::IDENTITY
        }
    }

    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self ∘ other`: `other` is applied first
    pub fn then(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f32::EPSILON {
            return None;
        }
        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

impl Default for Affine {
    fn default() -> Self {
        Affine::IDENTITY
    }
}

/// Current transform plus the save/restore stack shared by canvas implementations
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Affine,
    saved: Vec<Affine>,
}

impl TransformStack {
    pub fn current(&self) -> Affine {
        self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Unbalanced restores are ignored, like the browser does
    pub fn restore(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.current = previous;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current = self.current.then(&Affine::translation(dx, dy));
    }

    pub fn rotate(&mut self, radians: f32) {
        self.current = self.current.then(&Affine::rotation(radians));
    }
}

/// Font family classes the sticker renderer asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    /// Emoji face, falling back to the text face
    Emoji,
    /// UI sans-serif face
    Sans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size_px: f32,
    pub family: FontFamily,
    pub weight: FontWeight,
}

impl FontSpec {
    pub fn emoji(size_px: f32) -> Self {
        Self {
            size_px,
            family: FontFamily::Emoji,
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(size_px: f32) -> Self {
        Self {
            size_px,
            family: FontFamily::Sans,
            weight: FontWeight::Bold,
        }
    }
}

/// Immediate-mode 2D drawing target
///
/// Text is always drawn centered horizontally on `x` with its middle on `y`.
pub trait Canvas2d {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);

    /// Fill a rounded rectangle given in local coordinates
    fn fill_round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32, color: Color);

    /// Fill a single line of text centered on (x, y)
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: Color);

    /// Advance width of `text` in local units
    fn measure_text(&self, text: &str, font: &FontSpec) -> f32;
}

/// Font-independent advance estimate, used for characters no loaded face
/// can draw.
///
/// Wide characters (emoji, CJK) count a full em, everything else a bit over
/// half an em, which tracks common UI sans faces closely enough for layout.
pub fn approx_text_width(text: &str, font: &FontSpec) -> f32 {
    text.chars().map(|c| approx_char_width(c, font)).sum()
}

pub fn approx_char_width(c: char, font: &FontSpec) -> f32 {
    let em = font.size_px;
    let narrow = match font.weight {
        FontWeight::Bold => 0.62,
        FontWeight::Regular => 0.56,
    };
    match c as u32 {
        _ if fonts::is_invisible(c) => 0.0,
        0x2E80.. => em,
        _ if c == ' ' => em * 0.28,
        _ => em * narrow,
    }
}
