//! Effect trait definition
//!
//! Base contract for every augmentation effect, built-in or plugin-defined.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::transform::Transform;
use crate::error::{AugError, Result};

/// Flat parameter mapping (name -> scalar JSON number)
pub type ParamMap = Map<String, Value>;

/// Keys owned by the container rather than the effect body
pub const RESERVED_KEYS: [&str; 3] = ["type", "probability", "enabled"];

/// Probability used when neither the caller nor the document provides one
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Settings common to all effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    /// Chance the effect runs on a given sample. Stored as given, never clamped.
    pub probability: f64,
    /// Disabled effects are skipped by the compositor
    pub enabled: bool,
}

impl EffectParams {
    pub fn new(probability: f64, enabled: bool) -> Self {
        Self {
            probability,
            enabled,
        }
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self::new(DEFAULT_PROBABILITY, true)
    }
}

/// Base trait for all augmentation effects
///
/// An effect owns a fixed set of parameters decided at construction time.
/// The compositor asks it for an executable [`Transform`]; the pipeline
/// asks it for a flat document to persist.
pub trait Effect: Send + Sync {
    /// Type identifier, unique within a registry snapshot
    fn effect_type(&self) -> &str;

    /// Human-readable name for UIs
    fn display_name(&self) -> &str;

    fn probability(&self) -> f64;

    fn set_probability(&mut self, probability: f64);

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Build the executable transform for the current parameter state
    ///
    /// Must not consume randomness: everything random is drawn when the
    /// transform is applied. Constrained parameters are normalized here.
    fn build_transform(&self) -> Result<Box<dyn Transform>>;

    /// Current parameters, without `type`, `probability` and `enabled`
    fn get_params(&self) -> ParamMap;

    /// Set a single parameter by name, coercing the value
    ///
    /// Returns `UnknownParameter` for names the effect does not own and
    /// `InvalidParameter` when coercion fails; the stored value is left
    /// untouched in both cases.
    fn set_param(&mut self, name: &str, value: &Value) -> Result<()>;

    /// Clone the effect into a boxed trait object
    fn box_clone(&self) -> Box<dyn Effect>;

    /// Apply the keys present in `params`
    ///
    /// Reserved and unknown keys are ignored. A key that fails coercion keeps
    /// its previous value and is reported in the returned list; the other
    /// keys are still applied.
    fn set_params(&mut self, params: &ParamMap) -> Vec<AugError> {
        let mut rejected = Vec::new();
        for (name, value) in params {
            if RESERVED_KEYS.contains(&name.as_str()) {
                continue;
            }
            match self.set_param(name, value) {
                Ok(()) => {}
                Err(AugError::UnknownParameter { .. }) => {
                    log::debug!("{}: ignoring unknown parameter '{}'", self.effect_type(), name);
                }
                Err(e) => {
                    log::warn!("{}: {}", self.effect_type(), e);
                    rejected.push(e);
                }
            }
        }
        rejected
    }

    /// Parameters merged with `type`, `probability` and `enabled`
    fn to_document(&self) -> ParamMap {
        let mut doc = self.get_params();
        doc.insert("type".to_string(), Value::from(self.effect_type()));
        doc.insert("probability".to_string(), Value::from(self.probability()));
        doc.insert("enabled".to_string(), Value::from(self.is_enabled()));
        doc
    }
}

impl Clone for Box<dyn Effect> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

impl std::fmt::Debug for dyn Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("type", &self.effect_type())
            .field("probability", &self.probability())
            .field("enabled", &self.is_enabled())
            .field("params", &self.get_params())
            .finish()
    }
}

/// Helper macro to implement common Effect trait methods
///
/// Expects the implementing type to hold its [`EffectParams`] in a `params`
/// field and to be `Clone`.
#[macro_export]
macro_rules! impl_effect_common {
    ($effect_type:expr, $display_name:expr) => {
        fn effect_type(&self) -> &str {
            $effect_type
        }

        fn display_name(&self) -> &str {
            $display_name
        }

        fn probability(&self) -> f64 {
            self.params.probability
        }

        fn set_probability(&mut self, probability: f64) {
            self.params.probability = probability;
        }

        fn is_enabled(&self) -> bool {
            self.params.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.params.enabled = enabled;
        }

        fn box_clone(&self) -> Box<dyn $crate::effects::Effect> {
            Box::new(self.clone())
        }
    };
}
