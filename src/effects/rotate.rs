//! Rotate Effect
//!
//! Rotates the image about its center by a random angle in
//! `[-limit, limit]` degrees, keeping the canvas size and filling the
//! uncovered corners with black. Each box becomes the axis-aligned hull of
//! its rotated corners, clipped to the canvas.

use image::{DynamicImage, Rgb};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rand::rngs::StdRng;
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::params::coerce_i64;
use super::transform::{uniform, Transform};
use crate::error::{AugError, Result};
use crate::geometry::Frame;
use crate::impl_effect_common;

/// Default rotation limit in degrees
const DEFAULT_LIMIT: i64 = 15;

/// Random rotation
#[derive(Debug, Clone)]
pub struct RotateEffect {
    params: EffectParams,
    /// Maximum absolute angle in degrees
    limit: i64,
}

impl RotateEffect {
    pub fn new(limit: i64, params: EffectParams) -> Self {
        Self { params, limit }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl Default for RotateEffect {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, EffectParams::default())
    }
}

impl Effect for RotateEffect {
    impl_effect_common!("RotateEffect", "Rotate");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        // A negative limit describes the same symmetric range
        Ok(Box::new(Rotate::new(self.limit.unsigned_abs() as f64)))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("limit".to_string(), Value::from(self.limit));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "limit" => {
                self.limit = coerce_i64(name, value)?;
                Ok(())
            }
            _ => Err(AugError::UnknownParameter {
                effect_type: self.effect_type().to_string(),
                name: name.to_string(),
            }),
        }
    }
}

/// Executable rotation with a random angle in `[-limit, limit]` degrees
#[derive(Debug, Clone, Copy)]
pub struct Rotate {
    limit_degrees: f64,
}

impl Rotate {
    pub fn new(limit_degrees: f64) -> Self {
        Self { limit_degrees }
    }

    /// Rotate by a fixed angle (degrees, counter-clockwise on screen)
    pub fn rotate_by(frame: Frame, degrees: f64) -> Frame {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            return frame;
        }

        let theta = degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);

        // imageproc turns clockwise on screen for a positive angle
        let rotated = rotate_about_center(
            &frame.image.into_rgb8(),
            -theta as f32,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
        );

        // Forward map for box corners: p' = R(theta)(p - c) + c
        let (w, h) = (width as f64, height as f64);
        let forward = |nx: f64, ny: f64| {
            let dx = nx * w - cx;
            let dy = ny * h - cy;
            let x = cos * dx + sin * dy + cx;
            let y = -sin * dx + cos * dy + cy;
            (x / w, y / h)
        };

        let mut boxes = frame.boxes;
        for bbox in &mut boxes {
            let corners = [
                forward(bbox.x_min, bbox.y_min),
                forward(bbox.x_max, bbox.y_min),
                forward(bbox.x_max, bbox.y_max),
                forward(bbox.x_min, bbox.y_max),
            ];
            bbox.enclose(&corners);
        }

        Frame::new(DynamicImage::ImageRgb8(rotated), boxes)
    }
}

impl Transform for Rotate {
    fn name(&self) -> &str {
        "Rotate"
    }

    fn apply(&self, frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let angle = uniform(rng, -self.limit_degrees, self.limit_degrees);
        Ok(Self::rotate_by(frame, angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Sample};
    use approx::assert_relative_eq;
    use image::{GenericImageView, RgbImage};
    use rand::SeedableRng;
    use serde_json::json;

    fn sample_with_box(bbox: BoundingBox) -> Sample {
        Sample::new(DynamicImage::ImageRgb8(RgbImage::new(100, 100)), vec![bbox])
    }

    #[test]
    fn test_zero_rotation_is_identity_on_boxes() {
        let frame = sample_with_box(BoundingBox::new(0, 0.3, 0.4, 0.2, 0.1))
            .to_frame()
            .unwrap();
        let out = Rotate::rotate_by(frame, 0.0).into_sample();

        assert_relative_eq!(out.boxes[0].cx, 0.3, epsilon = 1e-9);
        assert_relative_eq!(out.boxes[0].cy, 0.4, epsilon = 1e-9);
        assert_relative_eq!(out.boxes[0].w, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_quarter_turn_swaps_box_extent() {
        let frame = sample_with_box(BoundingBox::new(0, 0.5, 0.5, 0.4, 0.2))
            .to_frame()
            .unwrap();
        let out = Rotate::rotate_by(frame, 90.0).into_sample();

        assert_relative_eq!(out.boxes[0].w, 0.2, epsilon = 1e-9);
        assert_relative_eq!(out.boxes[0].h, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_pixels_and_boxes_turn_the_same_way() {
        let mut image = RgbImage::new(100, 100);
        for x in 60..80 {
            for y in 45..55 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let frame = Sample::new(
            DynamicImage::ImageRgb8(image),
            vec![BoundingBox::new(0, 0.7, 0.5, 0.2, 0.1)],
        )
        .to_frame()
        .unwrap();

        let out = Rotate::rotate_by(frame, 90.0).into_sample();
        assert_relative_eq!(out.boxes[0].cx, 0.5, epsilon = 1e-9);
        assert_relative_eq!(out.boxes[0].cy, 0.3, epsilon = 1e-9);

        let rgb = out.image.to_rgb8();
        assert!(rgb.get_pixel(50, 30)[0] > 200);
        assert!(rgb.get_pixel(50, 70)[0] < 50);
        assert!(rgb.get_pixel(70, 50)[0] < 50);
    }

    #[test]
    fn test_rotation_keeps_canvas_size() {
        let frame = Sample::background(DynamicImage::ImageRgb8(RgbImage::new(64, 32)))
            .to_frame()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let out = Rotate::new(30.0).apply(frame, &mut rng).unwrap();
        assert_eq!(out.image.dimensions(), (64, 32));
    }

    #[test]
    fn test_limit_param_coercion() {
        let mut effect = RotateEffect::default();
        effect.set_param("limit", &json!("25")).unwrap();
        assert_eq!(effect.limit(), 25);
        assert!(effect.set_param("limit", &json!("wide")).is_err());
        assert_eq!(effect.limit(), 25);
    }
}
