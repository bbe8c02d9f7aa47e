// SPDX-License-Identifier: GPL-3.0-only

//! Font faces for sticker text
//!
//! A [`FontSet`] holds a text face and an optional emoji face. Every character
//! is taken from the first face in its family's chain that has a glyph for it:
//! emoji stickers try the emoji face first, everything else the text face.
//! DejaVu Sans Bold is compiled in and serves as the text face unless another
//! one is configured.
//!
//! Characters that no face covers are reported by [`Line::missing`]; raster
//! output turns them into [`PhotoError::GlyphUnavailable`].

use super::{FontFamily, FontSpec, approx_char_width};
use crate::errors::PhotoError;
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

const BUNDLED_SANS_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// The compiled-in text face, parsed once
pub fn bundled_face() -> Option<FontArc> {
    static FACE: OnceLock<Option<FontArc>> = OnceLock::new();
    FACE.get_or_init(|| match FontArc::try_from_slice(BUNDLED_SANS_BOLD) {
        Ok(face) => Some(face),
        Err(e) => {
            warn!(error = %e, "Bundled sticker font failed to parse");
            None
        }
    })
    .clone()
}

/// Load a TTF/OTF face from disk
pub fn load_face(path: &Path) -> Result<FontArc, PhotoError> {
    let bytes = std::fs::read(path)
        .map_err(|e| PhotoError::FontUnavailable(format!("{}: {}", path.display(), e)))?;
    let face = FontArc::try_from_vec(bytes)
        .map_err(|e| PhotoError::FontUnavailable(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), glyphs = face.glyph_count(), "Loaded sticker font");
    Ok(face)
}

/// Variation selectors and zero-width joiners draw nothing and take no space
pub fn is_invisible(c: char) -> bool {
    matches!(c as u32, 0xFE00..=0xFE0F | 0x200D)
}

#[derive(Clone)]
pub struct FontSet {
    text: Option<FontArc>,
    emoji: Option<FontArc>,
}

impl Default for FontSet {
    /// Bundled text face, no emoji face
    fn default() -> Self {
        Self {
            text: bundled_face(),
            emoji: None,
        }
    }
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("text", &self.text.is_some())
            .field("emoji", &self.emoji.is_some())
            .finish()
    }
}

/// One glyph of a laid out line
pub struct PlacedGlyph<'a> {
    pub face: &'a FontArc,
    pub id: GlyphId,
    /// Pen position from the start of the line
    pub x: f32,
}

/// A single line of text shaped left to right without wrapping
pub struct Line<'a> {
    pub glyphs: Vec<PlacedGlyph<'a>>,
    pub width: f32,
    /// Characters no face could draw, in order of appearance
    pub missing: Vec<char>,
}

impl FontSet {
    /// No faces at all; every visible character is missing
    pub fn empty() -> Self {
        Self {
            text: None,
            emoji: None,
        }
    }

    /// Faces from configured paths. Without a text path the bundled face is
    /// used; without an emoji path emoji fall back to the text face.
    pub fn load(text_path: Option<&Path>, emoji_path: Option<&Path>) -> Result<Self, PhotoError> {
        let text = match text_path {
            Some(path) => Some(load_face(path)?),
            None => bundled_face(),
        };
        let emoji = emoji_path.map(load_face).transpose()?;
        Ok(Self { text, emoji })
    }

    pub fn with_text_face(mut self, face: FontArc) -> Self {
        self.text = Some(face);
        self
    }

    pub fn with_emoji_face(mut self, face: FontArc) -> Self {
        self.emoji = Some(face);
        self
    }

    pub fn has_text_face(&self) -> bool {
        self.text.is_some()
    }

    pub fn has_emoji_face(&self) -> bool {
        self.emoji.is_some()
    }

    fn chain(&self, family: FontFamily) -> [Option<&FontArc>; 2] {
        match family {
            FontFamily::Emoji => [self.emoji.as_ref(), self.text.as_ref()],
            FontFamily::Sans => [self.text.as_ref(), self.emoji.as_ref()],
        }
    }

    /// Face whose vertical metrics position a line of `family` text
    pub fn primary(&self, family: FontFamily) -> Option<&FontArc> {
        self.chain(family).into_iter().flatten().next()
    }

    /// Chain index and face of the first face with a glyph for `c`
    fn face_for(&self, c: char, family: FontFamily) -> Option<(usize, &FontArc)> {
        self.chain(family)
            .into_iter()
            .enumerate()
            .find_map(|(index, face)| face.filter(|f| f.glyph_id(c).0 != 0).map(|f| (index, f)))
    }

    /// True when every visible character of `text` has a glyph
    pub fn covers(&self, text: &str, family: FontFamily) -> bool {
        text.chars()
            .filter(|c| !is_invisible(*c))
            .all(|c| self.face_for(c, family).is_some())
    }

    /// Place the glyphs of `text`. Missing characters advance by the width
    /// estimate so measuring never collapses.
    pub fn layout<'a>(&'a self, text: &str, font: &FontSpec) -> Line<'a> {
        let scale = PxScale::from(font.size_px);
        let mut line = Line {
            glyphs: Vec::new(),
            width: 0.0,
            missing: Vec::new(),
        };
        let mut previous: Option<(usize, GlyphId)> = None;

        for c in text.chars() {
            if is_invisible(c) {
                continue;
            }
            let Some((index, face)) = self.face_for(c, font.family) else {
                line.missing.push(c);
                line.width += approx_char_width(c, font);
                previous = None;
                continue;
            };
            let scaled = face.as_scaled(scale);
            let id = face.glyph_id(c);
            if let Some((prev_index, prev_id)) = previous {
                // Kerning only within one face
                if prev_index == index {
                    line.width += scaled.kern(prev_id, id);
                }
            }
            line.glyphs.push(PlacedGlyph {
                face,
                id,
                x: line.width,
            });
            line.width += scaled.h_advance(id);
            previous = Some((index, id));
        }
        line
    }

    /// Advance width of `text`, using the estimate only for missing glyphs
    pub fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        self.layout(text, font).width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::approx_text_width;

    #[test]
    fn test_bundled_face_parses() {
        assert!(bundled_face().is_some());
        assert!(FontSet::default().has_text_face());
    }

    #[test]
    fn test_measure_uses_real_advances() {
        let fonts = FontSet::default();
        let font = FontSpec::bold(42.0);
        let narrow = fonts.measure("iiii", &font);
        let wide = fonts.measure("WWWW", &font);
        assert!(wide > narrow * 1.5);
        assert!(fonts.layout("SALE", &font).missing.is_empty());
    }

    #[test]
    fn test_emoji_coverage_depends_on_faces() {
        let fonts = FontSet::default();
        assert!(fonts.covers("⚡", FontFamily::Emoji));
        // The selector in "❤️" is invisible and needs no glyph
        assert!(fonts.covers("❤️", FontFamily::Emoji));
        assert!(!fonts.covers("🔥", FontFamily::Emoji));
        assert_eq!(fonts.layout("🔥", &FontSpec::emoji(120.0)).missing, vec!['🔥']);
    }

    #[test]
    fn test_empty_set_falls_back_to_estimate() {
        let fonts = FontSet::empty();
        let font = FontSpec::bold(42.0);
        let line = fonts.layout("SALE", &font);
        assert!(line.glyphs.is_empty());
        assert_eq!(line.missing.len(), 4);
        assert_eq!(line.width, approx_text_width("SALE", &font));
    }

    #[test]
    fn test_load_from_disk_and_missing_path() {
        let asset = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/DejaVuSans-Bold.ttf");
        let fonts = FontSet::load(None, Some(&asset)).unwrap();
        assert!(fonts.has_emoji_face());

        let result = FontSet::load(Some(Path::new("/nonexistent/face.ttf")), None);
        assert!(matches!(result, Err(PhotoError::FontUnavailable(_))));
    }
}
