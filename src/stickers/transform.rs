// SPDX-License-Identifier: GPL-3.0-only

//! Authoring space to screen/export space mapping
//!
//! Sticker geometry lives in a fixed 1080x1920 authoring space. Every view of
//! it (the on-screen overlay, an export canvas) is a single uniform scale
//! `min(width / W, height / H)` anchored at the top-left corner.

use crate::canvas::Point;
use crate::constants::{AUTHORING_HEIGHT, AUTHORING_WIDTH};

/// Uniform authoring-to-view scale for one container size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ViewTransform {
    /// Fit the authoring space into a `width x height` container.
    ///
    /// Returns `None` for empty or non-finite sizes (a collapsed container
    /// during layout); callers keep their previous transform.
    pub fn fit(width: f32, height: f32) -> Option<Self> {
        let scale = fit_scale(width, height)?;
        Some(Self { scale })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_screen(&self, authoring: Point) -> Point {
        Point::new(authoring.x * self.scale, authoring.y * self.scale)
    }

    pub fn to_authoring(&self, screen: Point) -> Point {
        Point::new(screen.x / self.scale, screen.y / self.scale)
    }
}

/// `min(width / W, height / H)`, or `None` for a degenerate size
pub fn fit_scale(width: f32, height: f32) -> Option<f32> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((width / AUTHORING_WIDTH).min(height / AUTHORING_HEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_uses_limiting_axis() {
        // Wide container: height limits
        let t = ViewTransform::fit(1000.0, 960.0).unwrap();
        assert_eq!(t.scale(), 0.5);
        // Tall container: width limits
        let t = ViewTransform::fit(540.0, 5000.0).unwrap();
        assert_eq!(t.scale(), 0.5);
    }

    #[test]
    fn test_degenerate_sizes_rejected() {
        assert!(ViewTransform::fit(0.0, 100.0).is_none());
        assert!(ViewTransform::fit(100.0, -1.0).is_none());
        assert!(ViewTransform::fit(f32::NAN, 100.0).is_none());
    }

    #[test]
    fn test_round_trip_across_sizes() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(540.0, 960.0),
            Point::new(1079.5, 1919.5),
            Point::new(-30.0, 2100.0),
        ];
        for (w, h) in [(360.0, 640.0), (393.0, 852.0), (1920.0, 1080.0), (7.0, 13.0)] {
            let t = ViewTransform::fit(w, h).unwrap();
            for p in points {
                let back = t.to_authoring(t.to_screen(p));
                assert!(back.distance(p) < 1e-3, "{:?} -> {:?} at {}x{}", p, back, w, h);
            }
        }
    }
}
