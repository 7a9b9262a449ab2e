//! Gaussian Noise Effect
//!
//! Adds zero-mean Gaussian noise to every channel. The variance (in 8-bit
//! pixel units) is drawn uniformly from `[var_limit_min, var_limit_max]`
//! once per application.

use image::DynamicImage;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::params::coerce_f64;
use super::transform::{uniform, Transform};
use crate::error::{AugError, Result};
use crate::geometry::Frame;
use crate::impl_effect_common;

/// Additive Gaussian noise
#[derive(Debug, Clone)]
pub struct GaussianNoiseEffect {
    params: EffectParams,
    var_limit_min: f64,
    var_limit_max: f64,
}

impl GaussianNoiseEffect {
    pub fn new(var_limit_min: f64, var_limit_max: f64, params: EffectParams) -> Self {
        Self {
            params,
            var_limit_min,
            var_limit_max,
        }
    }
}

impl Default for GaussianNoiseEffect {
    fn default() -> Self {
        Self::new(10.0, 50.0, EffectParams::default())
    }
}

impl Effect for GaussianNoiseEffect {
    impl_effect_common!("GaussianNoiseEffect", "Gaussian Noise");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        if self.var_limit_min < 0.0 || self.var_limit_min > self.var_limit_max {
            return Err(AugError::invalid_param(
                "var_limit_min",
                format!(
                    "variance range [{}, {}] is empty or negative",
                    self.var_limit_min, self.var_limit_max
                ),
            ));
        }
        Ok(Box::new(GaussianNoise {
            var_min: self.var_limit_min,
            var_max: self.var_limit_max,
        }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("var_limit_min".to_string(), Value::from(self.var_limit_min));
        map.insert("var_limit_max".to_string(), Value::from(self.var_limit_max));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "var_limit_min" => self.var_limit_min = coerce_f64(name, value)?,
            "var_limit_max" => self.var_limit_max = coerce_f64(name, value)?,
            _ => {
                return Err(AugError::UnknownParameter {
                    effect_type: self.effect_type().to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Executable Gaussian noise
#[derive(Debug, Clone, Copy)]
pub struct GaussianNoise {
    var_min: f64,
    var_max: f64,
}

impl Transform for GaussianNoise {
    fn name(&self) -> &str {
        "GaussianNoise"
    }

    fn apply(&self, mut frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let sigma = uniform(rng, self.var_min, self.var_max).sqrt();
        let mut rgb = frame.image.into_rgb8();
        if sigma > 0.0 {
            let normal = Normal::new(0.0, sigma).map_err(|e| AugError::TransformFailed {
                effect_type: "GaussianNoiseEffect".to_string(),
                reason: e.to_string(),
            })?;
            for value in rgb.iter_mut() {
                let noisy = *value as f64 + normal.sample(rng);
                *value = noisy.round().clamp(0.0, 255.0) as u8;
            }
        }
        frame.image = DynamicImage::ImageRgb8(rgb);
        Ok(frame)
    }
}
