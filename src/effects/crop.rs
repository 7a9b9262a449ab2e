//! Crop Effects
//!
//! Three crop flavors. Crops are the effects that shrink boxes and push
//! them below the visibility threshold, so every crop goes through
//! [`Frame::crop`], which clips boxes and tracks the area lost.

use image::imageops::FilterType;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::params::coerce_f64;
use super::transform::{uniform, Transform};
use crate::error::{AugError, Result};
use crate::geometry::{Frame, PixelRect};
use crate::impl_effect_common;

/// Attempts at drawing a random-resized window before falling back to the full image
const RESIZED_CROP_ATTEMPTS: usize = 10;

fn check_fraction(name: &str, value: f64) -> Result<f64> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(AugError::invalid_param(
            name,
            format!("{} is not a fraction in (0, 1]", value),
        ))
    }
}

fn unknown(effect_type: &str, name: &str) -> AugError {
    AugError::UnknownParameter {
        effect_type: effect_type.to_string(),
        name: name.to_string(),
    }
}

/// Side length of a fractional window, at least one pixel
fn scaled(side: u32, fraction: f64) -> u32 {
    ((side as f64 * fraction).round() as u32).clamp(1, side.max(1))
}

// ============================================================================
// Random crop
// ============================================================================

/// Crops a window of fixed relative size at a random position
#[derive(Debug, Clone)]
pub struct RandomCropEffect {
    params: EffectParams,
    height_fraction: f64,
    width_fraction: f64,
}

impl RandomCropEffect {
    pub fn new(height_fraction: f64, width_fraction: f64, params: EffectParams) -> Self {
        Self {
            params,
            height_fraction,
            width_fraction,
        }
    }
}

impl Default for RandomCropEffect {
    fn default() -> Self {
        Self::new(0.8, 0.8, EffectParams::default())
    }
}

impl Effect for RandomCropEffect {
    impl_effect_common!("RandomCropEffect", "Random Crop");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        Ok(Box::new(RandomCrop {
            height_fraction: check_fraction("height_fraction", self.height_fraction)?,
            width_fraction: check_fraction("width_fraction", self.width_fraction)?,
        }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("height_fraction".to_string(), Value::from(self.height_fraction));
        map.insert("width_fraction".to_string(), Value::from(self.width_fraction));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "height_fraction" => self.height_fraction = coerce_f64(name, value)?,
            "width_fraction" => self.width_fraction = coerce_f64(name, value)?,
            _ => return Err(unknown(self.effect_type(), name)),
        }
        Ok(())
    }
}

/// Executable random crop
#[derive(Debug, Clone, Copy)]
pub struct RandomCrop {
    height_fraction: f64,
    width_fraction: f64,
}

impl Transform for RandomCrop {
    fn name(&self) -> &str {
        "RandomCrop"
    }

    fn apply(&self, frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let (width, height) = (frame.width(), frame.height());
        let crop_w = scaled(width, self.width_fraction);
        let crop_h = scaled(height, self.height_fraction);
        let x = rng.gen_range(0..=width.saturating_sub(crop_w));
        let y = rng.gen_range(0..=height.saturating_sub(crop_h));
        Ok(frame.crop(PixelRect::new(x, y, crop_w, crop_h)))
    }
}

// ============================================================================
// Center crop
// ============================================================================

/// Crops the central region of the image
#[derive(Debug, Clone)]
pub struct CenterCropEffect {
    params: EffectParams,
    scale: f64,
}

impl CenterCropEffect {
    pub fn new(scale: f64, params: EffectParams) -> Self {
        Self { params, scale }
    }
}

impl Default for CenterCropEffect {
    fn default() -> Self {
        Self::new(0.8, EffectParams::default())
    }
}

impl Effect for CenterCropEffect {
    impl_effect_common!("CenterCropEffect", "Center Crop");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        Ok(Box::new(CenterCrop {
            scale: check_fraction("scale", self.scale)?,
        }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("scale".to_string(), Value::from(self.scale));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "scale" => self.scale = coerce_f64(name, value)?,
            _ => return Err(unknown(self.effect_type(), name)),
        }
        Ok(())
    }
}

/// Executable center crop
#[derive(Debug, Clone, Copy)]
pub struct CenterCrop {
    scale: f64,
}

impl Transform for CenterCrop {
    fn name(&self) -> &str {
        "CenterCrop"
    }

    fn apply(&self, frame: Frame, _rng: &mut StdRng) -> Result<Frame> {
        let (width, height) = (frame.width(), frame.height());
        let crop_w = scaled(width, self.scale);
        let crop_h = scaled(height, self.scale);
        let window = PixelRect::new(
            width.saturating_sub(crop_w) / 2,
            height.saturating_sub(crop_h) / 2,
            crop_w,
            crop_h,
        );
        Ok(frame.crop(window))
    }
}

// ============================================================================
// Random resized crop
// ============================================================================

/// Crops a random area/aspect window and resizes it back to the input size
#[derive(Debug, Clone)]
pub struct RandomResizedCropEffect {
    params: EffectParams,
    scale_min: f64,
    scale_max: f64,
    ratio_min: f64,
    ratio_max: f64,
}

impl RandomResizedCropEffect {
    pub fn new(
        scale_min: f64,
        scale_max: f64,
        ratio_min: f64,
        ratio_max: f64,
        params: EffectParams,
    ) -> Self {
        Self {
            params,
            scale_min,
            scale_max,
            ratio_min,
            ratio_max,
        }
    }
}

impl Default for RandomResizedCropEffect {
    fn default() -> Self {
        Self::new(0.5, 1.0, 0.75, 1.33, EffectParams::default())
    }
}

impl Effect for RandomResizedCropEffect {
    impl_effect_common!("RandomResizedCropEffect", "Random Resized Crop");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        let scale_min = check_fraction("scale_min", self.scale_min)?;
        let scale_max = check_fraction("scale_max", self.scale_max)?;
        if scale_min > scale_max {
            return Err(AugError::invalid_param(
                "scale_min",
                format!("scale_min {} exceeds scale_max {}", scale_min, scale_max),
            ));
        }
        if self.ratio_min <= 0.0 || self.ratio_min > self.ratio_max {
            return Err(AugError::invalid_param(
                "ratio_min",
                format!(
                    "aspect range [{}, {}] is empty or not positive",
                    self.ratio_min, self.ratio_max
                ),
            ));
        }
        Ok(Box::new(RandomResizedCrop {
            scale: (scale_min, scale_max),
            log_ratio: (self.ratio_min.ln(), self.ratio_max.ln()),
        }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("scale_min".to_string(), Value::from(self.scale_min));
        map.insert("scale_max".to_string(), Value::from(self.scale_max));
        map.insert("ratio_min".to_string(), Value::from(self.ratio_min));
        map.insert("ratio_max".to_string(), Value::from(self.ratio_max));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "scale_min" => self.scale_min = coerce_f64(name, value)?,
            "scale_max" => self.scale_max = coerce_f64(name, value)?,
            "ratio_min" => self.ratio_min = coerce_f64(name, value)?,
            "ratio_max" => self.ratio_max = coerce_f64(name, value)?,
            _ => return Err(unknown(self.effect_type(), name)),
        }
        Ok(())
    }
}

/// Executable random resized crop
#[derive(Debug, Clone, Copy)]
pub struct RandomResizedCrop {
    scale: (f64, f64),
    log_ratio: (f64, f64),
}

impl RandomResizedCrop {
    fn pick_window(&self, width: u32, height: u32, rng: &mut StdRng) -> PixelRect {
        let area = width as f64 * height as f64;
        for _ in 0..RESIZED_CROP_ATTEMPTS {
            let target_area = area * uniform(rng, self.scale.0, self.scale.1);
            let ratio = uniform(rng, self.log_ratio.0, self.log_ratio.1).exp();
            let w = (target_area * ratio).sqrt().round() as u32;
            let h = (target_area / ratio).sqrt().round() as u32;
            if w > 0 && h > 0 && w <= width && h <= height {
                let x = rng.gen_range(0..=width - w);
                let y = rng.gen_range(0..=height - h);
                return PixelRect::new(x, y, w, h);
            }
        }
        PixelRect::new(0, 0, width, height)
    }
}

impl Transform for RandomResizedCrop {
    fn name(&self) -> &str {
        "RandomResizedCrop"
    }

    fn apply(&self, frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            return Ok(frame);
        }
        let window = self.pick_window(width, height, rng);
        let mut cropped = frame.crop(window);
        // Boxes are normalized, so resizing leaves them untouched
        cropped.image = cropped.image.resize_exact(width, height, FilterType::Triangle);
        Ok(cropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Sample};
    use image::{DynamicImage, GenericImageView, RgbImage};
    use rand::SeedableRng;
    use serde_json::json;

    fn blank_sample(width: u32, height: u32, boxes: Vec<BoundingBox>) -> Sample {
        Sample::new(DynamicImage::ImageRgb8(RgbImage::new(width, height)), boxes)
    }

    #[test]
    fn test_random_crop_size() {
        let effect = RandomCropEffect::new(0.5, 0.25, EffectParams::default());
        let transform = effect.build_transform().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let frame = blank_sample(200, 100, vec![]).to_frame().unwrap();

        let out = transform.apply(frame, &mut rng).unwrap();
        assert_eq!(out.image.dimensions(), (50, 50));
    }

    #[test]
    fn test_random_crop_rejects_bad_fraction_at_build() {
        let mut effect = RandomCropEffect::default();
        // Setting accepts any number
        effect.set_param("width_fraction", &json!(1.5)).unwrap();
        let err = effect.build_transform().err().unwrap();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_center_crop_drops_corner_box() {
        let sample = blank_sample(
            100,
            100,
            vec![
                BoundingBox::new(0, 0.05, 0.05, 0.1, 0.1),
                BoundingBox::new(1, 0.5, 0.5, 0.2, 0.2),
            ],
        );
        let transform = CenterCropEffect::new(0.5, EffectParams::default())
            .build_transform()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = transform.apply(sample.to_frame().unwrap(), &mut rng).unwrap();
        out.retain_visible(0.3);

        let out = out.into_sample();
        assert_eq!(out.class_ids(), vec![1]);
        approx::assert_relative_eq!(out.boxes[0].w, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_resized_crop_restores_size() {
        let effect = RandomResizedCropEffect::default();
        let transform = effect.build_transform().unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let sample = blank_sample(80, 60, vec![BoundingBox::new(0, 0.5, 0.5, 0.5, 0.5)]);

        let out = transform.apply(sample.to_frame().unwrap(), &mut rng).unwrap();
        assert_eq!(out.image.dimensions(), (80, 60));
    }

    #[test]
    fn test_resized_crop_rejects_inverted_scale() {
        let effect = RandomResizedCropEffect::new(0.9, 0.5, 0.75, 1.33, EffectParams::default());
        assert!(effect.build_transform().is_err());
    }
}
