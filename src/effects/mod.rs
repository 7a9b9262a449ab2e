//! Effect library
//!
//! An effect is a named, parameterized, probabilistic image + box transform.
//! All effects implement the [`Effect`] trait; the executable half of an
//! effect is a [`Transform`] built on demand by the compositor.
//!
//! The built-in set mirrors the classic detector-training augmentations:
//! flips, rotation, three crop flavors, blur, noise, color and glare fixes.

mod blur;
mod builtin;
mod color;
mod crop;
mod effect;
mod flip;
mod glare;
mod noise;
mod params;
mod preset;
mod rotate;
mod transform;

pub use blur::{BlurEffect, BoxBlur};
pub use builtin::{builtin_constructors, builtin_kernel, EffectConstructor};
pub use color::{BrightnessContrast, BrightnessContrastEffect, RgbShift, RgbShiftEffect};
pub use crop::{
    CenterCrop, CenterCropEffect, RandomCrop, RandomCropEffect, RandomResizedCrop,
    RandomResizedCropEffect,
};
pub use effect::{Effect, EffectParams, ParamMap, DEFAULT_PROBABILITY, RESERVED_KEYS};
pub use flip::{HorizontalFlip, HorizontalFlipEffect, VerticalFlip, VerticalFlipEffect};
pub use glare::{GlareDampen, GlareDampener};
pub use noise::{GaussianNoise, GaussianNoiseEffect};
pub use params::{coerce_f64, coerce_i64};
pub use preset::PresetEffect;
pub use rotate::{Rotate, RotateEffect};
pub use transform::{uniform, Transform};
