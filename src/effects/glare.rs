//! Glare Dampener
//!
//! Darkens blown-out highlights: every pixel whose channels are all at or
//! above `threshold` is reduced by `reduce_by`. Runs on every sample by
//! default (probability 1.0), since it corrects rather than varies.

use image::DynamicImage;
use rand::rngs::StdRng;
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::params::coerce_i64;
use super::transform::Transform;
use crate::error::{AugError, Result};
use crate::geometry::Frame;
use crate::impl_effect_common;

#[derive(Debug, Clone)]
pub struct GlareDampener {
    params: EffectParams,
    threshold: i64,
    reduce_by: i64,
}

impl GlareDampener {
    pub fn new(threshold: i64, reduce_by: i64, params: EffectParams) -> Self {
        Self {
            params,
            threshold,
            reduce_by,
        }
    }
}

impl Default for GlareDampener {
    fn default() -> Self {
        Self::new(240, 20, EffectParams::new(1.0, true))
    }
}

impl Effect for GlareDampener {
    impl_effect_common!("GlareDampener", "Glare Dampener");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        let threshold = u8::try_from(self.threshold).map_err(|_| {
            AugError::invalid_param("threshold", format!("{} is outside [0, 255]", self.threshold))
        })?;
        let reduce_by = u8::try_from(self.reduce_by).map_err(|_| {
            AugError::invalid_param("reduce_by", format!("{} is outside [0, 255]", self.reduce_by))
        })?;
        Ok(Box::new(GlareDampen {
            threshold,
            reduce_by,
        }))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("threshold".to_string(), Value::from(self.threshold));
        map.insert("reduce_by".to_string(), Value::from(self.reduce_by));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "threshold" => self.threshold = coerce_i64(name, value)?,
            "reduce_by" => self.reduce_by = coerce_i64(name, value)?,
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

/// Executable highlight dampening
#[derive(Debug, Clone, Copy)]
pub struct GlareDampen {
    threshold: u8,
    reduce_by: u8,
}

impl Transform for GlareDampen {
    fn name(&self) -> &str {
        "GlareDampen"
    }

    fn apply(&self, mut frame: Frame, _rng: &mut StdRng) -> Result<Frame> {
        let mut rgb = frame.image.into_rgb8();
        for pixel in rgb.pixels_mut() {
            if pixel.0.iter().all(|&c| c >= self.threshold) {
                for c in pixel.0.iter_mut() {
                    *c = c.saturating_sub(self.reduce_by);
                }
            }
        }
        frame.image = DynamicImage::ImageRgb8(rgb);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Sample;
    use image::{Rgb, RgbImage};
    use rand::SeedableRng;

    #[test]
    fn test_only_white_pixels_are_dampened() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([250, 250, 250]));
        img.put_pixel(1, 0, Rgb([250, 100, 250]));
        let frame = Sample::background(DynamicImage::ImageRgb8(img)).to_frame().unwrap();

        let transform = GlareDampener::default().build_transform().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let out = transform.apply(frame, &mut rng).unwrap();

        assert_eq!(out.image.as_bytes(), &[230, 230, 230, 250, 100, 250]);
    }

    #[test]
    fn test_default_probability_is_one() {
        assert_eq!(GlareDampener::default().probability(), 1.0);
    }

    #[test]
    fn test_threshold_out_of_range_fails_at_build() {
        let effect = GlareDampener::new(300, 20, EffectParams::default());
        assert!(effect.build_transform().is_err());
    }
}
