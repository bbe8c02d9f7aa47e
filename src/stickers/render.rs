// SPDX-License-Identifier: GPL-3.0-only

//! Drawing stickers onto a [`Canvas2d`]

use super::transform::fit_scale;
use super::types::{StickerKind, StickerObject, label_box};
use crate::canvas::{Canvas2d, Color};
use crate::constants::sticker as metrics;
use tracing::debug;

/// Draw `objects` back to front onto `canvas`, mapping authoring space onto a
/// `target_width x target_height` area with its own fit scale.
pub fn render_objects(
    canvas: &mut dyn Canvas2d,
    objects: &[StickerObject],
    target_width: u32,
    target_height: u32,
) {
    let Some(k) = fit_scale(target_width as f32, target_height as f32) else {
        debug!(target_width, target_height, "Skipping sticker render for empty target");
        return;
    };

    for object in objects {
        canvas.save();
        canvas.translate(object.position.x * k, object.position.y * k);
        canvas.rotate(object.rotation_degrees.to_radians());
        draw_kind(canvas, &object.kind, object.scale * k);
        canvas.restore();
    }
}

/// Draw one sticker centered on the local origin at combined scale `s`
fn draw_kind(canvas: &mut dyn Canvas2d, kind: &StickerKind, s: f32) {
    let font = kind.font(s);
    match kind {
        StickerKind::Emoji { glyph } => {
            canvas.fill_text(glyph, 0.0, 0.0, &font, Color::WHITE);
        }
        StickerKind::Label {
            text,
            background,
            color,
        } => {
            let text_width = canvas.measure_text(text, &font);
            let (width, height) = label_box(text_width, s);
            let radius = (metrics::LABEL_CORNER_RADIUS * s).min(height / 2.0);
            canvas.fill_round_rect(-width / 2.0, -height / 2.0, width, height, radius, *background);
            canvas.fill_text(text, 0.0, metrics::LABEL_TEXT_OFFSET_Y * s, &font, *color);
        }
        StickerKind::Text { text, color } => {
            canvas.fill_text(text, 0.0, 0.0, &font, *color);
        }
    }
}
