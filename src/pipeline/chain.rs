//! Pipeline (ordered effect list)
//!
//! Effects run in list order, index 0 first. Position-based edits with an
//! out-of-range index do nothing.

use crate::effects::Effect;

/// Number of augmented copies generated per source image by default
pub const DEFAULT_COPIES_PER_IMAGE: usize = 5;

/// An ordered, editable sequence of effects plus run settings
#[derive(Debug, Clone)]
pub struct Pipeline {
    effects: Vec<Box<dyn Effect>>,
    enabled: bool,
    copies_per_image: usize,
}

impl Pipeline {
    /// Create a new empty, enabled pipeline
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            enabled: true,
            copies_per_image: DEFAULT_COPIES_PER_IMAGE,
        }
    }

    /// Append an effect at the end of the chain
    pub fn add(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    /// Remove the effect at `index`
    ///
    /// Returns `None` and leaves the chain untouched if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Effect>> {
        if index < self.effects.len() {
            Some(self.effects.remove(index))
        } else {
            None
        }
    }

    /// Move an effect from one position to another
    ///
    /// Both indices must address existing effects; otherwise nothing changes
    /// and `false` is returned.
    pub fn move_effect(&mut self, from_index: usize, to_index: usize) -> bool {
        let len = self.effects.len();
        if from_index >= len || to_index >= len {
            return false;
        }
        let effect = self.effects.remove(from_index);
        self.effects.insert(to_index, effect);
        true
    }

    /// Remove every effect
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Get a reference to the effect at `index`
    pub fn get(&self, index: usize) -> Option<&dyn Effect> {
        self.effects.get(index).map(|e| e.as_ref())
    }

    /// Get a mutable reference to the effect at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Effect + 'static)> {
        self.effects.get_mut(index).map(|e| e.as_mut())
    }

    /// Iterate over effects in application order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    /// Effects the compositor will use, in order
    pub fn enabled_effects(&self) -> impl Iterator<Item = &dyn Effect> {
        self.iter().filter(|e| e.is_enabled())
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn copies_per_image(&self) -> usize {
        self.copies_per_image
    }

    /// Set the number of copies per image (at least 1)
    pub fn set_copies_per_image(&mut self, copies: usize) {
        if copies == 0 {
            log::warn!("copies_per_image must be positive, using 1");
        }
        self.copies_per_image = copies.max(1);
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{BlurEffect, EffectParams, HorizontalFlipEffect, RotateEffect};

    fn types(pipeline: &Pipeline) -> Vec<&str> {
        pipeline.iter().map(|e| e.effect_type()).collect()
    }

    fn sample_pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new();
        pipeline.add(Box::new(HorizontalFlipEffect::default()));
        pipeline.add(Box::new(RotateEffect::default()));
        pipeline.add(Box::new(BlurEffect::default()));
        pipeline
    }

    #[test]
    fn test_pipeline_new() {
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert!(pipeline.is_enabled());
        assert_eq!(pipeline.copies_per_image(), 5);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let pipeline = sample_pipeline();
        assert_eq!(
            types(&pipeline),
            vec!["HorizontalFlipEffect", "RotateEffect", "BlurEffect"]
        );
    }

    #[test]
    fn test_remove() {
        let mut pipeline = sample_pipeline();
        let removed = pipeline.remove(1).unwrap();
        assert_eq!(removed.effect_type(), "RotateEffect");
        assert_eq!(types(&pipeline), vec!["HorizontalFlipEffect", "BlurEffect"]);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut pipeline = sample_pipeline();
        assert!(pipeline.remove(3).is_none());
        assert!(pipeline.remove(usize::MAX).is_none());
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn test_move_effect() {
        let mut pipeline = sample_pipeline();
        assert!(pipeline.move_effect(0, 2));
        assert_eq!(
            types(&pipeline),
            vec!["RotateEffect", "BlurEffect", "HorizontalFlipEffect"]
        );
        assert!(pipeline.move_effect(2, 0));
        assert_eq!(
            types(&pipeline),
            vec!["HorizontalFlipEffect", "RotateEffect", "BlurEffect"]
        );
    }

    #[test]
    fn test_move_effect_out_of_range_is_noop() {
        let mut pipeline = sample_pipeline();
        assert!(!pipeline.move_effect(0, 3));
        assert!(!pipeline.move_effect(5, 0));
        assert_eq!(
            types(&pipeline),
            vec!["HorizontalFlipEffect", "RotateEffect", "BlurEffect"]
        );
    }

    #[test]
    fn test_enabled_effects_skips_disabled() {
        let mut pipeline = sample_pipeline();
        pipeline.add(Box::new(BlurEffect::new(3, EffectParams::new(1.0, false))));
        pipeline.get_mut(1).unwrap().set_enabled(false);

        let enabled: Vec<_> = pipeline.enabled_effects().map(|e| e.effect_type()).collect();
        assert_eq!(enabled, vec!["HorizontalFlipEffect", "BlurEffect"]);
    }

    #[test]
    fn test_copies_per_image_is_positive() {
        let mut pipeline = Pipeline::new();
        pipeline.set_copies_per_image(0);
        assert_eq!(pipeline.copies_per_image(), 1);
        pipeline.set_copies_per_image(3);
        assert_eq!(pipeline.copies_per_image(), 3);
    }

    #[test]
    fn test_clone_is_deep() {
        let pipeline = sample_pipeline();
        let mut copy = pipeline.clone();
        copy.get_mut(0).unwrap().set_probability(1.0);
        assert_eq!(pipeline.get(0).unwrap().probability(), 0.5);
    }
}
