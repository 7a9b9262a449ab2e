//! Plugin-defined effects
//!
//! A plugin definition names a new effect type on top of an existing one
//! with its own default parameters. The result behaves exactly like the
//! base effect except for its type name.

use serde_json::Value;

use super::effect::{Effect, ParamMap};
use super::transform::Transform;
use crate::error::Result;

/// An effect type registered by a plugin definition
#[derive(Debug, Clone)]
pub struct PresetEffect {
    type_name: String,
    display_name: String,
    inner: Box<dyn Effect>,
}

impl PresetEffect {
    pub fn new(
        type_name: impl Into<String>,
        display_name: impl Into<String>,
        inner: Box<dyn Effect>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            display_name: display_name.into(),
            inner,
        }
    }

    /// Type of the effect this preset wraps
    pub fn base_type(&self) -> &str {
        self.inner.effect_type()
    }
}

impl Effect for PresetEffect {
    fn effect_type(&self) -> &str {
        &self.type_name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn probability(&self) -> f64 {
        self.inner.probability()
    }

    fn set_probability(&mut self, probability: f64) {
        self.inner.set_probability(probability);
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    fn build_transform(&self) -> Result<Box<dyn Transform>> {
        self.inner.build_transform()
    }

    fn get_params(&self) -> ParamMap {
        self.inner.get_params()
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        self.inner.set_param(name, value)
    }

    fn box_clone(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{BlurEffect, EffectParams};
    use serde_json::json;

    #[test]
    fn test_preset_serializes_under_its_own_name() {
        let preset = PresetEffect::new(
            "StrongBlur",
            "Strong Blur",
            Box::new(BlurEffect::new(15, EffectParams::new(0.8, true))),
        );
        let doc = preset.to_document();

        assert_eq!(doc["type"], json!("StrongBlur"));
        assert_eq!(doc["blur_limit"], json!(15));
        assert_eq!(doc["probability"], json!(0.8));
        assert_eq!(preset.base_type(), "BlurEffect");
    }
}
