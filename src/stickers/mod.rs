// SPDX-License-Identifier: GPL-3.0-only

//! Sticker layer
//!
//! Owns the ordered sticker collection (insertion order is z-order, later on
//! top), the live authoring-to-screen transform and the drag state. Pointer
//! input arrives in screen coordinates and is converted with the transform
//! that is current when the event is handled, so a resize during a drag never
//! leaves the sticker behind the pointer.
//!
//! Operations that name a sticker which no longer exists are no-ops.

pub mod presets;
pub mod render;
pub mod transform;
pub mod types;

pub use presets::{EMOJI_CATALOG, LABEL_PRESETS, LabelPreset, QUICK_TEXTS, label_preset, renderable_emoji};
pub use transform::ViewTransform;
pub use types::{StickerId, StickerKind, StickerLimits, StickerObject};

use crate::canvas::{Canvas2d, Color, FontSet, Point, RasterCanvas};
use crate::constants::{AUTHORING_HEIGHT, AUTHORING_WIDTH, sticker as metrics};
use crate::errors::PhotoError;
use crate::pipelines::photo::encoding::encode_png;
use tracing::{debug, info};
use types::wrap_degrees;

/// Drag in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    id: StickerId,
    /// Pointer minus sticker center at drag start, in authoring units
    offset: Point,
}

#[derive(Debug, Clone, Default)]
pub struct StickerLayer {
    objects: Vec<StickerObject>,
    view: ViewTransform,
    limits: StickerLimits,
    drag: Option<DragState>,
    selected: Option<StickerId>,
    /// Faces used for hit bounds and raster export
    fonts: FontSet,
}

impl StickerLayer {
    pub fn new(limits: StickerLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn limits(&self) -> StickerLimits {
        self.limits
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Recompute the screen transform for a new container size.
    ///
    /// Degenerate sizes are ignored and the previous transform is kept.
    pub fn resize(&mut self, container_width: f32, container_height: f32) -> bool {
        match ViewTransform::fit(container_width, container_height) {
            Some(view) => {
                self.view = view;
                debug!(container_width, container_height, scale = view.scale(), "Sticker view resized");
                true
            }
            None => false,
        }
    }

    pub fn to_screen(&self, authoring: Point) -> Point {
        self.view.to_screen(authoring)
    }

    pub fn to_authoring(&self, screen: Point) -> Point {
        self.view.to_authoring(screen)
    }

    fn canvas_center() -> Point {
        Point::new(AUTHORING_WIDTH / 2.0, AUTHORING_HEIGHT / 2.0)
    }

    fn push(&mut self, kind: StickerKind) -> StickerId {
        let object = StickerObject::new(kind, Self::canvas_center());
        let id = object.id;
        info!(%id, kind = object.kind.name(), content = object.kind.content(), "Sticker added");
        self.objects.push(object);
        self.selected = Some(id);
        id
    }

    pub fn add_emoji(&mut self, glyph: &str) -> StickerId {
        self.push(StickerKind::emoji(glyph))
    }

    pub fn add_label(&mut self, text: &str, background: Color, color: Color) -> StickerId {
        self.push(StickerKind::label(text, background, color))
    }

    /// Add a label from the preset catalog with the default text color
    pub fn add_preset(&mut self, preset: &LabelPreset) -> StickerId {
        self.add_label(preset.text, preset.background, default_text_color())
    }

    /// Add free text; surrounding whitespace is trimmed and blank text is
    /// rejected
    pub fn add_text(&mut self, text: &str, color: Color) -> Option<StickerId> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank text sticker");
            return None;
        }
        Some(self.push(StickerKind::text(text, color)))
    }

    /// Append an existing object on top of the z-order, keeping its id.
    /// An object with the same id already in the layer is replaced. Scale is
    /// clamped to the limits and rotation wrapped into [0, 360).
    pub fn insert(&mut self, mut object: StickerObject) -> StickerId {
        object.scale = if object.scale.is_finite() {
            self.limits.clamp_scale(object.scale)
        } else {
            self.limits.clamp_scale(1.0)
        };
        object.rotation_degrees = if object.rotation_degrees.is_finite() {
            wrap_degrees(object.rotation_degrees)
        } else {
            0.0
        };
        let id = object.id;
        self.objects.retain(|o| o.id != id);
        self.objects.push(object);
        self.selected = Some(id);
        id
    }

    pub fn objects(&self) -> &[StickerObject] {
        &self.objects
    }

    pub fn get(&self, id: StickerId) -> Option<&StickerObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: StickerId) -> Option<&mut StickerObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn selected(&self) -> Option<StickerId> {
        self.selected
    }

    /// Select a sticker, or clear the selection with `None`.
    /// Returns false if the id is unknown.
    pub fn select(&mut self, id: Option<StickerId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    /// Start dragging `id` from a screen pointer position
    pub fn begin_drag(&mut self, id: StickerId, screen: Point) -> bool {
        let pointer = self.to_authoring(screen);
        let Some(object) = self.get(id) else {
            return false;
        };
        let offset = Point::new(pointer.x - object.position.x, pointer.y - object.position.y);
        self.drag = Some(DragState { id, offset });
        self.selected = Some(id);
        debug!(%id, offset_x = offset.x, offset_y = offset.y, "Drag started");
        true
    }

    /// Move the dragged sticker so it stays under the pointer
    pub fn continue_drag(&mut self, screen: Point) {
        let Some(drag) = self.drag else {
            return;
        };
        let pointer = self.to_authoring(screen);
        match self.get_mut(drag.id) {
            Some(object) => {
                object.position = Point::new(pointer.x - drag.offset.x, pointer.y - drag.offset.y);
            }
            None => self.drag = None,
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!(id = %drag.id, "Drag ended");
        }
    }

    pub fn dragging(&self) -> Option<StickerId> {
        self.drag.map(|d| d.id)
    }

    /// Change a sticker's scale by `delta`, clamped to the configured range
    pub fn adjust_scale(&mut self, id: StickerId, delta: f32) {
        let limits = self.limits;
        if let Some(object) = self.get_mut(id) {
            object.scale = limits.clamp_scale(object.scale + delta);
        }
    }

    /// One step bigger (`true`) or smaller (`false`)
    pub fn step_scale(&mut self, id: StickerId, grow: bool) {
        let step = self.limits.scale_step;
        self.adjust_scale(id, if grow { step } else { -step });
    }

    /// Rotate a sticker by `delta_degrees`, wrapped into [0, 360)
    pub fn adjust_rotation(&mut self, id: StickerId, delta_degrees: f32) {
        if let Some(object) = self.get_mut(id) {
            object.rotation_degrees = wrap_degrees(object.rotation_degrees + delta_degrees);
        }
    }

    /// One rotation step clockwise
    pub fn step_rotation(&mut self, id: StickerId) {
        self.adjust_rotation(id, self.limits.rotation_step);
    }

    pub fn remove(&mut self, id: StickerId) -> Option<StickerObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        let removed = self.objects.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        info!(%id, "Sticker removed");
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.drag = None;
        self.selected = None;
    }

    /// Topmost sticker under a screen point. Bounds come from the same font
    /// advances the export raster uses.
    pub fn hit_test(&self, screen: Point) -> Option<StickerId> {
        let point = self.to_authoring(screen);
        self.objects
            .iter()
            .rev()
            .find(|object| object.contains(point, &self.fonts))
            .map(|object| object.id)
    }

    /// Draw every sticker onto an export canvas of the given size.
    ///
    /// Uses its own authoring-to-target scale; the live screen transform is
    /// not involved.
    pub fn render(&self, canvas: &mut dyn Canvas2d, target_width: u32, target_height: u32) {
        render::render_objects(canvas, &self.objects, target_width, target_height);
    }

    /// Stickers alone on a transparent canvas, encoded as PNG
    pub fn export_overlay_png(&self, width: u32, height: u32) -> Result<Vec<u8>, PhotoError> {
        let mut canvas = RasterCanvas::new(width, height, self.fonts.clone());
        self.render(&mut canvas, width, height);
        encode_png(&canvas.finish()?)
    }
}

fn default_text_color() -> Color {
    Color::from_hex(metrics::DEFAULT_TEXT_COLOR).unwrap_or(Color::WHITE)
}

/// Default pill color for custom labels
pub fn default_label_background() -> Color {
    Color::from_hex(metrics::DEFAULT_LABEL_BACKGROUND).unwrap_or(Color::BLACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> StickerLayer {
        let mut layer = StickerLayer::default();
        layer.resize(540.0, 960.0);
        layer
    }

    #[test]
    fn test_new_stickers_are_centered_and_selected() {
        let mut layer = layer();
        let id = layer.add_emoji("🔥");
        let obj = layer.get(id).unwrap();
        assert_eq!(obj.position, Point::new(540.0, 960.0));
        assert_eq!(obj.scale, 1.0);
        assert_eq!(obj.rotation_degrees, 0.0);
        assert_eq!(layer.selected(), Some(id));
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut layer = layer();
        assert!(layer.add_text("   ", Color::WHITE).is_none());
        let id = layer.add_text("  Hurry Up!  ", Color::WHITE).unwrap();
        assert_eq!(layer.get(id).unwrap().kind.content(), "Hurry Up!");
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut layer = layer();
        let id = layer.add_emoji("⭐");
        let ghost = uuid::Uuid::new_v4();
        layer.adjust_scale(ghost, 1.0);
        layer.adjust_rotation(ghost, 10.0);
        assert!(layer.remove(ghost).is_none());
        assert!(!layer.begin_drag(ghost, Point::new(0.0, 0.0)));
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.get(id).unwrap().scale, 1.0);
    }

    #[test]
    fn test_remove_clears_selection_and_drag() {
        let mut layer = layer();
        let id = layer.add_emoji("🎉");
        assert!(layer.begin_drag(id, Point::new(270.0, 480.0)));
        layer.remove(id);
        assert_eq!(layer.selected(), None);
        assert_eq!(layer.dragging(), None);
        // Stray pointer move after removal is harmless
        layer.continue_drag(Point::new(10.0, 10.0));
        assert!(layer.is_empty());
    }

    #[test]
    fn test_drag_keeps_grab_offset() {
        let mut layer = layer();
        let id = layer.add_emoji("💥");
        // Grab 10 screen px right of center (20 authoring units at scale 0.5)
        layer.begin_drag(id, Point::new(280.0, 480.0));
        layer.continue_drag(Point::new(110.0, 100.0));
        layer.end_drag();
        assert_eq!(layer.get(id).unwrap().position, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut layer = layer();
        let below = layer.add_emoji("✨");
        let above = layer.add_emoji("⚡");
        let center = layer.to_screen(Point::new(540.0, 960.0));
        assert_eq!(layer.hit_test(center), Some(above));
        layer.remove(above);
        assert_eq!(layer.hit_test(center), Some(below));
        assert_eq!(layer.hit_test(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_step_helpers_use_limits() {
        let mut layer = StickerLayer::new(StickerLimits {
            rotation_step: 45.0,
            ..StickerLimits::default()
        });
        let id = layer.add_emoji("💯");
        layer.step_rotation(id);
        layer.step_scale(id, false);
        let obj = layer.get(id).unwrap();
        assert_eq!(obj.rotation_degrees, 45.0);
        assert!((obj.scale - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_overlay_png_is_transparent_without_stickers() {
        let layer = layer();
        let png = layer.export_overlay_png(4, 4).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert!(image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_insert_normalizes_scale_and_rotation() {
        let mut layer = layer();
        let mut object = StickerObject::new(StickerKind::emoji("⚡"), Point::new(100.0, 100.0));
        object.scale = 25.0;
        object.rotation_degrees = -30.0;
        let id = layer.insert(object.clone());
        let stored = layer.get(id).unwrap();
        assert_eq!(stored.scale, 4.0);
        assert_eq!(stored.rotation_degrees, 330.0);

        object.scale = 0.01;
        object.rotation_degrees = 725.0;
        layer.insert(object.clone());
        let stored = layer.get(id).unwrap();
        assert_eq!(stored.scale, 0.3);
        assert_eq!(stored.rotation_degrees, 5.0);
        assert_eq!(layer.len(), 1);

        object.scale = f32::NAN;
        object.rotation_degrees = f32::INFINITY;
        layer.insert(object);
        let stored = layer.get(id).unwrap();
        assert_eq!(stored.scale, 1.0);
        assert_eq!(stored.rotation_degrees, 0.0);
    }

    #[test]
    fn test_hit_bounds_track_drawn_width() {
        let mut layer = StickerLayer::default();
        layer.resize(1080.0, 1920.0);
        let id = layer.add_text("WWWWWWWW", Color::WHITE).unwrap();
        let font = layer.get(id).unwrap().kind.font(1.0);
        let half = layer.fonts().measure("WWWWWWWW", &font) / 2.0;
        assert_eq!(layer.hit_test(Point::new(540.0 + half - 2.0, 960.0)), Some(id));
        assert_eq!(layer.hit_test(Point::new(540.0 + half + 2.0, 960.0)), None);
    }
}
