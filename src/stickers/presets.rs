// SPDX-License-Identifier: GPL-3.0-only

//! Built-in sticker catalogs

use crate::canvas::{Color, FontFamily, FontSet};

/// Promotional label with its accent color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPreset {
    pub text: &'static str,
    pub background: Color,
}

impl LabelPreset {
    const fn new(text: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            text,
            background: Color::rgb(r, g, b),
        }
    }
}

pub const LABEL_PRESETS: [LabelPreset; 8] = [
    LabelPreset::new("SALE", 0xef, 0x44, 0x44),
    LabelPreset::new("NEW", 0x3b, 0x82, 0xf6),
    LabelPreset::new("HOT", 0xf9, 0x73, 0x16),
    LabelPreset::new("LIMITED", 0xa8, 0x55, 0xf7),
    LabelPreset::new("FREE", 0x22, 0xc5, 0x5e),
    LabelPreset::new("50% OFF", 0xec, 0x48, 0x99),
    LabelPreset::new("BOGO", 0x63, 0x66, 0xf1),
    LabelPreset::new("TREND", 0xea, 0xb3, 0x08),
];

pub const EMOJI_CATALOG: [&str; 16] = [
    "✨", "🔥", "💥", "🎉", "⭐", "🛍️", "💯", "⚡",
    "❤️", "😍", "👀", "🎁", "💰", "🏷️", "📣", "👉",
];

/// One-tap text stickers
pub const QUICK_TEXTS: [&str; 8] = [
    "Amazing Deal!",
    "Limited Time!",
    "Best Price!",
    "Don't Miss Out!",
    "Exclusive Offer!",
    "Special Price!",
    "Hurry Up!",
    "Great Value!",
];

/// Catalog emoji that `fonts` can draw, in catalog order
pub fn renderable_emoji(fonts: &FontSet) -> Vec<&'static str> {
    EMOJI_CATALOG
        .iter()
        .copied()
        .filter(|emoji| fonts.covers(emoji, FontFamily::Emoji))
        .collect()
}

/// Look up a label preset by its text, ignoring case
pub fn label_preset(text: &str) -> Option<&'static LabelPreset> {
    LABEL_PRESETS
        .iter()
        .find(|preset| preset.text.eq_ignore_ascii_case(text.trim()))
}
