//! Blur Effect
//!
//! Mean (box) blur with a random odd kernel size drawn from `[3, limit]`.
//! The kernel must be odd; an even `blur_limit` is rounded up to the next
//! odd value when the transform is built, while `get_params()` keeps
//! reporting the raw value the caller set.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::box_filter;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use super::effect::{Effect, EffectParams, ParamMap};
use super::params::coerce_i64;
use super::transform::Transform;
use crate::error::{AugError, Result};
use crate::geometry::Frame;
use crate::impl_effect_common;

const DEFAULT_BLUR_LIMIT: i64 = 7;

/// Smallest kernel drawn when the limit allows a real blur
const MIN_KERNEL: u32 = 3;

/// Random box blur
#[derive(Debug, Clone)]
pub struct BlurEffect {
    params: EffectParams,
    blur_limit: i64,
}

impl BlurEffect {
    pub fn new(blur_limit: i64, params: EffectParams) -> Self {
        Self { params, blur_limit }
    }

    /// Build the concrete blur transform
    pub fn build_blur(&self) -> Result<BoxBlur> {
        if self.blur_limit < 1 {
            return Err(AugError::invalid_param(
                "blur_limit",
                format!("{} is below the minimum kernel size 1", self.blur_limit),
            ));
        }
        let limit = u32::try_from(self.blur_limit).map_err(|_| {
            AugError::invalid_param("blur_limit", format!("{} is too large", self.blur_limit))
        })?;
        let limit = if limit % 2 == 0 { limit + 1 } else { limit };
        Ok(BoxBlur { max_kernel: limit })
    }
}

impl Default for BlurEffect {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_LIMIT, EffectParams::default())
    }
}

impl Effect for BlurEffect {
    impl_effect_common!("BlurEffect", "Blur");

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        Ok(Box::new(self.build_blur()?))
    }

    fn get_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("blur_limit".to_string(), Value::from(self.blur_limit));
        map
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "blur_limit" => {
                self.blur_limit = coerce_i64(name, value)?;
                Ok(())
            }
            _ => Err(AugError::UnknownParameter {
                effect_type: self.effect_type().to_string(),
                name: name.to_string(),
            }),
        }
    }
}

/// Executable box blur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxBlur {
    max_kernel: u32,
}

impl BoxBlur {
    /// Largest (odd) kernel size this blur may draw
    pub fn max_kernel(&self) -> u32 {
        self.max_kernel
    }

    fn draw_kernel(&self, rng: &mut StdRng) -> u32 {
        if self.max_kernel < MIN_KERNEL {
            return self.max_kernel;
        }
        let steps = (self.max_kernel - MIN_KERNEL) / 2;
        MIN_KERNEL + 2 * rng.gen_range(0..=steps)
    }

    /// Mean filter with edge clamping, run per channel
    ///
    /// The radius is capped at the larger image side; past that point the
    /// window already covers the whole image in both directions.
    pub fn blur_with_kernel(image: &RgbImage, kernel: u32) -> RgbImage {
        let (width, height) = image.dimensions();
        if kernel <= 1 || width == 0 || height == 0 {
            return image.clone();
        }
        let radius = (kernel / 2).min(width.max(height));

        let channels: Vec<GrayImage> = (0..3)
            .map(|c| {
                let plane = GrayImage::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y)[c]]));
                box_filter(&plane, radius, radius)
            })
            .collect();

        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                channels[0].get_pixel(x, y)[0],
                channels[1].get_pixel(x, y)[0],
                channels[2].get_pixel(x, y)[0],
            ])
        })
    }
}

impl Transform for BoxBlur {
    fn name(&self) -> &str {
        "Blur"
    }

    fn apply(&self, mut frame: Frame, rng: &mut StdRng) -> Result<Frame> {
        let kernel = self.draw_kernel(rng);
        let rgb = frame.image.into_rgb8();
        frame.image = DynamicImage::ImageRgb8(Self::blur_with_kernel(&rgb, kernel));
        Ok(frame)
    }
}
