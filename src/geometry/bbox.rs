//! Bounding box types and per-step box arithmetic

use serde::{Deserialize, Serialize};

use super::frame::PixelRect;
use crate::error::{AugError, Result};

/// Slack allowed when validating normalized extents read from label files
pub const GEOMETRY_TOLERANCE: f64 = 1e-6;

// ============================================================================
// BoundingBox
// ============================================================================

/// A labeled box in normalized center format
///
/// All geometric fields are relative to the image width/height and lie in
/// `[0, 1]`. `class_id` indexes the project's class list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    /// Create a new box
    pub fn new(class_id: u32, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            class_id,
            cx,
            cy,
            w,
            h,
        }
    }

    /// Corners as `(x_min, y_min, x_max, y_max)`, normalized
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        let half_w = self.w / 2.0;
        let half_h = self.h / 2.0;
        (
            self.cx - half_w,
            self.cy - half_h,
            self.cx + half_w,
            self.cy + half_h,
        )
    }

    /// Check that the box has positive size and lies inside the image
    pub fn validate(&self) -> Result<()> {
        let values = [self.cx, self.cy, self.w, self.h];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AugError::InvalidGeometry {
                reason: format!("non-finite coordinate in {:?}", self),
            });
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(AugError::InvalidGeometry {
                reason: format!("box has no area: w={} h={}", self.w, self.h),
            });
        }

        let (x_min, y_min, x_max, y_max) = self.corners();
        let lo = -GEOMETRY_TOLERANCE;
        let hi = 1.0 + GEOMETRY_TOLERANCE;
        if x_min < lo || y_min < lo || x_max > hi || y_max > hi {
            return Err(AugError::InvalidGeometry {
                reason: format!(
                    "box extends outside the image: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                    x_min, y_min, x_max, y_max
                ),
            });
        }
        Ok(())
    }

    /// Format as a YOLO label line with six-decimal precision
    pub fn to_label_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

// ============================================================================
// TrackedBox
// ============================================================================

/// A box in flight through the compositor
///
/// Stored as normalized corners. `visibility` is the product of the
/// per-step retained area fractions, i.e. how much of the box's original
/// area is still inside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedBox {
    pub class_id: u32,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub visibility: f64,
}

impl TrackedBox {
    /// Start tracking a validated box. Tolerance overshoot is clamped away.
    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        let (x_min, y_min, x_max, y_max) = bbox.corners();
        Self {
            class_id: bbox.class_id,
            x_min: x_min.clamp(0.0, 1.0),
            y_min: y_min.clamp(0.0, 1.0),
            x_max: x_max.clamp(0.0, 1.0),
            y_max: y_max.clamp(0.0, 1.0),
            visibility: 1.0,
        }
    }

    /// Back to center format
    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox {
            class_id: self.class_id,
            cx: (self.x_min + self.x_max) / 2.0,
            cy: (self.y_min + self.y_max) / 2.0,
            w: self.x_max - self.x_min,
            h: self.y_max - self.y_min,
        }
    }

    /// Normalized area
    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min).max(0.0) * (self.y_max - self.y_min).max(0.0)
    }

    /// Mirror around the vertical center line
    pub fn flip_horizontal(&mut self) {
        let (x_min, x_max) = (1.0 - self.x_max, 1.0 - self.x_min);
        self.x_min = x_min;
        self.x_max = x_max;
    }

    /// Mirror around the horizontal center line
    pub fn flip_vertical(&mut self) {
        let (y_min, y_max) = (1.0 - self.y_max, 1.0 - self.y_min);
        self.y_min = y_min;
        self.y_max = y_max;
    }

    /// Re-express the box relative to a crop window of an image of the given size
    ///
    /// The part of the box outside the window is cut off and the visibility
    /// shrinks by the fraction lost.
    pub fn reframe(&mut self, window: PixelRect, width: u32, height: u32) {
        let (w, h) = (width as f64, height as f64);
        let (wx, wy) = (window.x as f64, window.y as f64);
        let (ww, wh) = (window.width.max(1) as f64, window.height.max(1) as f64);

        let x_min = (self.x_min * w - wx) / ww;
        let y_min = (self.y_min * h - wy) / wh;
        let x_max = (self.x_max * w - wx) / ww;
        let y_max = (self.y_max * h - wy) / wh;

        self.set_clipped(x_min, y_min, x_max, y_max);
    }

    /// Replace the box with the axis-aligned hull of `points`, clipped to the image
    ///
    /// Points are normalized coordinates; used by rotations, where the hull
    /// of the rotated corners is the new box.
    pub fn enclose(&mut self, points: &[(f64, f64)]) {
        let mut x_min = f64::INFINITY;
        let mut y_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for &(x, y) in points {
            x_min = x_min.min(x);
            y_min = y_min.min(y);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        self.set_clipped(x_min, y_min, x_max, y_max);
    }

    fn set_clipped(&mut self, x_min: f64, y_min: f64, x_max: f64, y_max: f64) {
        let unclipped = (x_max - x_min).max(0.0) * (y_max - y_min).max(0.0);

        self.x_min = x_min.clamp(0.0, 1.0);
        self.y_min = y_min.clamp(0.0, 1.0);
        self.x_max = x_max.clamp(0.0, 1.0);
        self.y_max = y_max.clamp(0.0, 1.0);

        let clipped = self.area();
        self.visibility *= if unclipped > 0.0 {
            clipped / unclipped
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corners_round_trip() {
        let bbox = BoundingBox::new(2, 0.5, 0.4, 0.2, 0.1);
        let tracked = TrackedBox::from_bbox(&bbox);
        assert_relative_eq!(tracked.x_min, 0.4);
        assert_relative_eq!(tracked.y_max, 0.45);

        let back = tracked.to_bbox();
        assert_eq!(back.class_id, 2);
        assert_relative_eq!(back.cx, 0.5);
        assert_relative_eq!(back.w, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_boxes() {
        assert!(BoundingBox::new(0, 0.5, 0.5, 0.0, 0.1).validate().is_err());
        assert!(BoundingBox::new(0, 0.95, 0.5, 0.2, 0.1).validate().is_err());
        assert!(BoundingBox::new(0, f64::NAN, 0.5, 0.2, 0.1).validate().is_err());
        assert!(BoundingBox::new(0, 0.5, 0.5, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_label_line_precision() {
        let bbox = BoundingBox::new(3, 0.5, 0.25, 0.125, 1.0 / 3.0);
        assert_eq!(bbox.to_label_line(), "3 0.500000 0.250000 0.125000 0.333333");
    }

    #[test]
    fn test_flip_horizontal() {
        let mut tracked = TrackedBox::from_bbox(&BoundingBox::new(0, 0.2, 0.5, 0.1, 0.1));
        tracked.flip_horizontal();
        let bbox = tracked.to_bbox();
        assert_relative_eq!(bbox.cx, 0.8, epsilon = 1e-12);
        assert_relative_eq!(bbox.cy, 0.5, epsilon = 1e-12);
        assert_relative_eq!(bbox.w, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_reframe_partial_visibility() {
        // Box spans x in [40, 60] of a 100px image; window keeps x in [50, 100)
        let mut tracked = TrackedBox::from_bbox(&BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2));
        tracked.reframe(PixelRect::new(50, 0, 50, 100), 100, 100);

        assert_relative_eq!(tracked.visibility, 0.5, epsilon = 1e-9);
        assert_relative_eq!(tracked.x_min, 0.0);
        assert_relative_eq!(tracked.x_max, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_reframe_fully_outside() {
        let mut tracked = TrackedBox::from_bbox(&BoundingBox::new(0, 0.1, 0.1, 0.1, 0.1));
        tracked.reframe(PixelRect::new(50, 50, 50, 50), 100, 100);
        assert_eq!(tracked.visibility, 0.0);
        assert_eq!(tracked.area(), 0.0);
    }

    #[test]
    fn test_visibility_is_cumulative() {
        let mut tracked = TrackedBox::from_bbox(&BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2));
        tracked.reframe(PixelRect::new(50, 0, 50, 100), 100, 100);
        tracked.reframe(PixelRect::new(0, 50, 100, 50), 100, 100);
        assert_relative_eq!(tracked.visibility, 0.25, epsilon = 1e-9);
    }
}
