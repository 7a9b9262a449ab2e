//! Built-in effect set

use super::blur::BlurEffect;
use super::color::{BrightnessContrastEffect, RgbShiftEffect};
use super::crop::{CenterCropEffect, RandomCropEffect, RandomResizedCropEffect};
use super::effect::Effect;
use super::flip::{HorizontalFlipEffect, VerticalFlipEffect};
use super::glare::GlareDampener;
use super::noise::GaussianNoiseEffect;
use super::rotate::RotateEffect;

/// Produces a default-configured effect instance
pub type EffectConstructor = fn() -> Box<dyn Effect>;

fn boxed<E: Effect + Default + 'static>() -> Box<dyn Effect> {
    Box::new(E::default())
}

/// Every compiled-in effect type with its constructor, in registration order
pub fn builtin_constructors() -> Vec<(&'static str, EffectConstructor)> {
    vec![
        ("HorizontalFlipEffect", boxed::<HorizontalFlipEffect> as EffectConstructor),
        ("VerticalFlipEffect", boxed::<VerticalFlipEffect> as EffectConstructor),
        ("RotateEffect", boxed::<RotateEffect> as EffectConstructor),
        ("RandomCropEffect", boxed::<RandomCropEffect> as EffectConstructor),
        ("CenterCropEffect", boxed::<CenterCropEffect> as EffectConstructor),
        ("RandomResizedCropEffect", boxed::<RandomResizedCropEffect> as EffectConstructor),
        ("BlurEffect", boxed::<BlurEffect> as EffectConstructor),
        ("GaussianNoiseEffect", boxed::<GaussianNoiseEffect> as EffectConstructor),
        ("BrightnessContrastEffect", boxed::<BrightnessContrastEffect> as EffectConstructor),
        ("RGBShiftEffect", boxed::<RgbShiftEffect> as EffectConstructor),
        ("GlareDampener", boxed::<GlareDampener> as EffectConstructor),
    ]
}

/// A default instance of a compiled-in effect, if `name` is one
pub fn builtin_kernel(name: &str) -> Option<Box<dyn Effect>> {
    builtin_constructors()
        .into_iter()
        .find(|(kernel, _)| *kernel == name)
        .map(|(_, construct)| construct())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_match_effect_types() {
        for (name, construct) in builtin_constructors() {
            assert_eq!(construct().effect_type(), name);
        }
    }

    #[test]
    fn test_names_unique() {
        let names: HashSet<_> = builtin_constructors().iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), builtin_constructors().len());
    }

    #[test]
    fn test_every_default_builds() {
        for (name, construct) in builtin_constructors() {
            assert!(construct().build_transform().is_ok(), "{} failed to build", name);
        }
    }

    #[test]
    fn test_builtin_kernel_lookup() {
        assert!(builtin_kernel("BlurEffect").is_some());
        assert!(builtin_kernel("SwirlEffect").is_none());
    }
}
