//! Flip Effects
//!
//! Mirror the image and every box around the vertical or horizontal
//! center line. Flips have no parameters.

use rand::rngs::StdRng;
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::transform::Transform;
use crate::error::{AugError, Result};
use crate::geometry::Frame;
use crate::impl_effect_common;

// ============================================================================
// Horizontal flip
// ============================================================================

/// Left-right mirror
#[derive(Debug, Clone, Default)]
pub struct HorizontalFlipEffect {
    params: EffectParams,
}

impl HorizontalFlipEffect {
    pub fn new(params: EffectParams) -> Self {
        Self { params }
    }
}

impl Effect for HorizontalFlipEffect {
    impl_effect_common!("HorizontalFlipEffect", "Horizontal Flip");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        Ok(Box::new(HorizontalFlip))
    }

    fn get_params(&self) -> ParamMap {
        ParamMap::new()
    }

    fn set_param(&mut self, name: &str, _value: &Value) -> Result<()> {
        Err(AugError::UnknownParameter {
            effect_type: self.effect_type().to_string(),
            name: name.to_string(),
        })
    }
}

/// Executable horizontal flip
#[derive(Debug, Clone, Copy)]
pub struct HorizontalFlip;

impl Transform for HorizontalFlip {
    fn name(&self) -> &str {
        "HorizontalFlip"
    }

    fn apply(&self, mut frame: Frame, _rng: &mut StdRng) -> Result<Frame> {
        frame.image = frame.image.fliph();
        for bbox in &mut frame.boxes {
            bbox.flip_horizontal();
        }
        Ok(frame)
    }
}

// ============================================================================
// Vertical flip
// ============================================================================

/// Top-bottom mirror
#[derive(Debug, Clone, Default)]
pub struct VerticalFlipEffect {
    params: EffectParams,
}

impl VerticalFlipEffect {
    pub fn new(params: EffectParams) -> Self {
        Self { params }
    }
}

impl Effect for VerticalFlipEffect {
    impl_effect_common!("VerticalFlipEffect", "Vertical Flip");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        Ok(Box::new(VerticalFlip))
    }

    fn get_params(&self) -> ParamMap {
        ParamMap::new()
    }

    fn set_param(&mut self, name: &str, _value: &Value) -> Result<()> {
        Err(AugError::UnknownParameter {
            effect_type: self.effect_type().to_string(),
            name: name.to_string(),
        })
    }
}

/// Executable vertical flip
#[derive(Debug, Clone, Copy)]
pub struct VerticalFlip;

impl Transform for VerticalFlip {
    fn name(&self) -> &str {
        "VerticalFlip"
    }

    fn apply(&self, mut frame: Frame, _rng: &mut StdRng) -> Result<Frame> {
        frame.image = frame.image.flipv();
        for bbox in &mut frame.boxes {
            bbox.flip_vertical();
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Sample};
    use approx::assert_relative_eq;
    use image::{DynamicImage, Rgb, RgbImage};
    use rand::SeedableRng;

    fn two_pixel_image() -> DynamicImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_horizontal_flip_pixels_and_box() {
        let sample = Sample::new(two_pixel_image(), vec![BoundingBox::new(4, 0.25, 0.5, 0.5, 1.0)]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = HorizontalFlip
            .apply(sample.to_frame().unwrap(), &mut rng)
            .unwrap()
            .into_sample();

        assert_eq!(out.image.as_bytes(), &[0, 0, 255, 255, 0, 0]);
        assert_eq!(out.boxes[0].class_id, 4);
        assert_relative_eq!(out.boxes[0].cx, 0.75);
        assert_relative_eq!(out.boxes[0].w, 0.5);
    }

    #[test]
    fn test_vertical_flip_box() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        let sample = Sample::new(image, vec![BoundingBox::new(0, 0.5, 0.1, 0.2, 0.2)]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = VerticalFlip
            .apply(sample.to_frame().unwrap(), &mut rng)
            .unwrap()
            .into_sample();

        assert_relative_eq!(out.boxes[0].cy, 0.9, epsilon = 1e-12);
        assert_relative_eq!(out.boxes[0].cx, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_flip_has_no_params() {
        let mut effect = HorizontalFlipEffect::default();
        assert!(effect.get_params().is_empty());
        assert!(effect.set_param("anything", &Value::from(1)).is_err());
    }
}
