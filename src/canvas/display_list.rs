// SPDX-License-Identifier: GPL-3.0-only

//! Command-recording canvas
//!
//! Records every fill with the transform that was current when it was issued.
//! Shells that draw through their own graphics stack replay the list; tests use
//! it to check exported sticker geometry without touching pixels.

use super::{Affine, Canvas2d, Color, FontSet, FontSpec, Point, TransformStack};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    RoundRect {
        transform: Affine,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        color: Color,
    },
    Text {
        transform: Affine,
        text: String,
        x: f32,
        y: f32,
        font: FontSpec,
        color: Color,
    },
}

impl DrawCommand {
    /// Center of the command's local shape, in target coordinates
    pub fn anchor(&self) -> Point {
        match self {
            DrawCommand::RoundRect {
                transform,
                x,
                y,
                width,
                height,
                ..
            } => transform.apply(Point::new(x + width / 2.0, y + height / 2.0)),
            DrawCommand::Text { transform, x, y, .. } => transform.apply(Point::new(*x, *y)),
        }
    }

    pub fn transform(&self) -> &Affine {
        match self {
            DrawCommand::RoundRect { transform, .. } | DrawCommand::Text { transform, .. } => {
                transform
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayList {
    width: u32,
    height: u32,
    stack: TransformStack,
    commands: Vec<DrawCommand>,
    fonts: FontSet,
}

impl DisplayList {
    /// Empty list measuring text with the default [`FontSet`]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stack: TransformStack::default(),
            commands: Vec::new(),
            fonts: FontSet::default(),
        }
    }

    /// Measure with the faces the replay target will draw with
    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Replay onto another canvas
    pub fn replay(&self, target: &mut dyn Canvas2d) {
        for command in &self.commands {
            let t = command.transform();
            target.save();
            // Decompose back into translate + rotate; sticker transforms never shear
            target.translate(t.e, t.f);
            target.rotate(t.b.atan2(t.a));
            match command {
                DrawCommand::RoundRect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    color,
                    ..
                } => target.fill_round_rect(*x, *y, *width, *height, *radius, *color),
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    font,
                    color,
                    ..
                } => target.fill_text(text, *x, *y, font, *color),
            }
            target.restore();
        }
    }
}

impl Canvas2d for DisplayList {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
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
        self.commands.push(DrawCommand::RoundRect {
            transform: self.stack.current(),
            x,
            y,
            width,
            height,
            radius,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: Color) {
        self.commands.push(DrawCommand::Text {
            transform: self.stack.current(),
            text: text.to_string(),
            x,
            y,
            font: *font,
            color,
        });
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        self.fonts.measure(text, font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_current_transform() {
        let mut list = DisplayList::new(100, 100);
        list.save();
        list.translate(40.0, 60.0);
        list.fill_round_rect(-10.0, -5.0, 20.0, 10.0, 3.0, Color::BLACK);
        list.restore();
        list.fill_text("hi", 1.0, 2.0, &FontSpec::bold(10.0), Color::WHITE);

        let commands = list.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].anchor(), Point::new(40.0, 60.0));
        assert_eq!(commands[1].anchor(), Point::new(1.0, 2.0));
    }
}
