//! Color Effects
//!
//! Photometric adjustments that leave geometry alone: random brightness and
//! contrast, and independent per-channel RGB shifts.

use image::DynamicImage;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::params::{coerce_f64, coerce_i64};
use super::transform::{uniform, Transform};
use crate::error::{AugError, Result};
use crate::geometry::Frame;
use crate::impl_effect_common;

fn unknown(effect_type: &str, name: &str) -> AugError {
    AugError::UnknownParameter {
        effect_type: effect_type.to_string(),
        name: name.to_string(),
    }
}

// ============================================================================
// Brightness / contrast
// ============================================================================

/// Random brightness and contrast
///
/// `out = alpha * in + beta * 255` with `alpha = 1 + U(-contrast, contrast)`
/// and `beta = U(-brightness, brightness)`.
#[derive(Debug, Clone)]
pub struct BrightnessContrastEffect {
    params: EffectParams,
    brightness_limit: f64,
    contrast_limit: f64,
}

impl BrightnessContrastEffect {
    pub fn new(brightness_limit: f64, contrast_limit: f64, params: EffectParams) -> Self {
        Self {
            params,
            brightness_limit,
            contrast_limit,
        }
    }
}

impl Default for BrightnessContrastEffect {
    fn default() -> Self {
        Self::new(0.2, 0.2, EffectParams::default())
    }
}

impl Effect for BrightnessContrastEffect {
    impl_effect_common!("BrightnessContrastEffect", "Brightness / Contrast");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        if self.brightness_limit < 0.0 {
            return Err(AugError::invalid_param(
                "brightness_limit",
                format!("{} is negative", self.brightness_limit),
            ));
        }
        if self.contrast_limit < 0.0 {
            return Err(AugError::invalid_param(
                "contrast_limit",
                format!("{} is negative", self.contrast_limit),
            ));
        }
        Ok(Box::new(BrightnessContrast {
            brightness: self.brightness_limit,
            contrast: self.contrast_limit,
        }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("brightness_limit".to_string(), Value::from(self.brightness_limit));
        map.insert("contrast_limit".to_string(), Value::from(self.contrast_limit));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "brightness_limit" => self.brightness_limit = coerce_f64(name, value)?,
            "contrast_limit" => self.contrast_limit = coerce_f64(name, value)?,
            _ => return Err(unknown(self.effect_type(), name)),
        }
        Ok(())
    }
}

/// Executable brightness/contrast adjustment
#[derive(Debug, Clone, Copy)]
pub struct BrightnessContrast {
    brightness: f64,
    contrast: f64,
}

impl BrightnessContrast {
    /// Apply a fixed gain and offset (offset in units of full scale)
    pub fn adjust(image: DynamicImage, alpha: f64, beta: f64) -> DynamicImage {
        let offset = beta * 255.0;
        let mut rgb = image.into_rgb8();
        for value in rgb.iter_mut() {
            *value = (*value as f64 * alpha + offset).round().clamp(0.0, 255.0) as u8;
        }
        DynamicImage::ImageRgb8(rgb)
    }
}

impl Transform for BrightnessContrast {
    fn name(&self) -> &str {
        "BrightnessContrast"
    }

    fn apply(&self, mut frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let alpha = 1.0 + uniform(rng, -self.contrast, self.contrast);
        let beta = uniform(rng, -self.brightness, self.brightness);
        frame.image = Self::adjust(frame.image, alpha, beta);
        Ok(frame)
    }
}

// ============================================================================
// RGB shift
// ============================================================================

/// Random per-channel shift in `[-limit, limit]`
#[derive(Debug, Clone)]
pub struct RgbShiftEffect {
    params: EffectParams,
    r_shift: i64,
    g_shift: i64,
    b_shift: i64,
}

impl RgbShiftEffect {
    pub fn new(r_shift: i64, g_shift: i64, b_shift: i64, params: EffectParams) -> Self {
        Self {
            params,
            r_shift,
            g_shift,
            b_shift,
        }
    }
}

impl Default for RgbShiftEffect {
    fn default() -> Self {
        Self::new(20, 20, 20, EffectParams::default())
    }
}

impl Effect for RgbShiftEffect {
    impl_effect_common!("RGBShiftEffect", "RGB Shift");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        let limits = [
            ("r_shift", self.r_shift),
            ("g_shift", self.g_shift),
            ("b_shift", self.b_shift),
        ];
        let mut shifts = [0i64; 3];
        for (slot, (name, limit)) in shifts.iter_mut().zip(limits) {
            if !(0..=255).contains(&limit) {
                return Err(AugError::invalid_param(
                    name,
                    format!("{} is outside [0, 255]", limit),
                ));
            }
            *slot = limit;
        }
        Ok(Box::new(RgbShift { limits: shifts }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("r_shift".to_string(), Value::from(self.r_shift));
        map.insert("g_shift".to_string(), Value::from(self.g_shift));
        map.insert("b_shift".to_string(), Value::from(self.b_shift));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "r_shift" => self.r_shift = coerce_i64(name, value)?,
            "g_shift" => self.g_shift = coerce_i64(name, value)?,
            "b_shift" => self.b_shift = coerce_i64(name, value)?,
            _ => return Err(unknown(self.effect_type(), name)),
        }
        Ok(())
    }
}

/// Executable RGB shift
#[derive(Debug, Clone, Copy)]
pub struct RgbShift {
    limits: [i64; 3],
}

impl RgbShift {
    /// Add a fixed offset to each channel
    pub fn shift(image: DynamicImage, offsets: [i64; 3]) -> DynamicImage {
        let mut rgb = image.into_rgb8();
        for pixel in rgb.pixels_mut() {
            for c in 0..3 {
                pixel[c] = (pixel[c] as i64 + offsets[c]).clamp(0, 255) as u8;
            }
        }
        DynamicImage::ImageRgb8(rgb)
    }
}

impl Transform for RgbShift {
    fn name(&self) -> &str {
        "RGBShift"
    }

    fn apply(&self, mut frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let offsets = self.limits.map(|limit| rng.gen_range(-limit..=limit));
        frame.image = Self::shift(frame.image, offsets);
        Ok(frame)
    }
}
