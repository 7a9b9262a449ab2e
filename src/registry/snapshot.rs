//! Registry snapshot

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::effects::{coerce_f64, Effect, ParamMap};
use crate::error::{AugError, Result};

pub(crate) type Factory = Arc<dyn Fn() -> Box<dyn Effect> + Send + Sync>;

#[derive(Clone)]
struct RegistryEntry {
    factory: Factory,
    source: String,
}

/// An immutable mapping from effect type name to constructor
///
/// Only discovery populates a registry; everything public is read-only.
#[derive(Clone, Default)]
pub struct EffectRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl EffectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry holding exactly the compiled-in effect set
    pub fn builtin() -> Self {
        super::discover(&[super::PluginSource::Builtin]).registry
    }

    /// Register a constructor, replacing any earlier one of the same name
    ///
    /// Returns the source of the replaced entry.
    pub(crate) fn insert(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        factory: Factory,
    ) -> Option<String> {
        self.entries
            .insert(
                name.into(),
                RegistryEntry {
                    factory,
                    source: source.into(),
                },
            )
            .map(|previous| previous.source)
    }

    /// Default instance with the effect's own default probability/enabled state
    pub fn construct_default(&self, type_name: &str) -> Option<Box<dyn Effect>> {
        self.entries.get(type_name).map(|entry| (entry.factory)())
    }

    /// Default instance with the given probability and enabled state
    ///
    /// `None` when the type is not registered.
    pub fn construct(
        &self,
        type_name: &str,
        probability: f64,
        enabled: bool,
    ) -> Option<Box<dyn Effect>> {
        let mut effect = self.construct_default(type_name)?;
        effect.set_probability(probability);
        effect.set_enabled(enabled);
        Some(effect)
    }

    /// Rebuild an effect from its flat document
    ///
    /// Missing `probability`/`enabled` keep the type's defaults. Parameter
    /// keys that fail coercion keep their default values (logged by
    /// [`Effect::set_params`]).
    pub fn from_document(&self, doc: &ParamMap) -> Result<Box<dyn Effect>> {
        let type_name = doc
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AugError::UnknownEffect {
                effect_type: "<missing type>".to_string(),
            })?;
        let mut effect =
            self.construct_default(type_name)
                .ok_or_else(|| AugError::UnknownEffect {
                    effect_type: type_name.to_string(),
                })?;

        if let Some(value) = doc.get("probability") {
            match coerce_f64("probability", value) {
                Ok(p) => effect.set_probability(p),
                Err(e) => log::warn!("{}: {}", type_name, e),
            }
        }
        if let Some(enabled) = doc.get("enabled").and_then(Value::as_bool) {
            effect.set_enabled(enabled);
        }
        effect.set_params(doc);
        Ok(effect)
    }

    /// Check if a type is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Where a type was registered from
    pub fn source_of(&self, type_name: &str) -> Option<&str> {
        self.entries.get(type_name).map(|e| e.source.as_str())
    }

    /// All registered type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("effects", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{builtin_constructors, ParamMap};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_builtin_registry() {
        let registry = EffectRegistry::builtin();
        assert_eq!(registry.len(), 11);
        assert!(registry.contains("HorizontalFlipEffect"));
        assert_eq!(registry.source_of("BlurEffect"), Some("builtin"));
    }

    #[test]
    fn test_construct_known_and_unknown() {
        let registry = EffectRegistry::builtin();

        let effect = registry.construct("RotateEffect", 0.9, false).unwrap();
        assert_eq!(effect.effect_type(), "RotateEffect");
        assert_eq!(effect.probability(), 0.9);
        assert!(!effect.is_enabled());

        assert!(registry.construct("SwirlEffect", 0.5, true).is_none());
    }

    #[test]
    fn test_from_document() {
        let registry = EffectRegistry::builtin();
        let doc = json!({"type": "BlurEffect", "probability": 0.3, "enabled": false, "blur_limit": 11});
        let effect = registry.from_document(doc.as_object().unwrap()).unwrap();

        assert_eq!(effect.to_document(), *doc.as_object().unwrap());
    }

    /// Every parameter nudged away from its default
    fn nudged(params: &ParamMap) -> ParamMap {
        params
            .iter()
            .map(|(name, value)| {
                let nudged = match value.as_i64() {
                    Some(v) => Value::from(v + 3),
                    None => Value::from(value.as_f64().unwrap_or_default() + 0.05),
                };
                (name.clone(), nudged)
            })
            .collect()
    }

    #[test]
    fn test_every_builtin_round_trips_through_its_document() {
        let registry = EffectRegistry::builtin();
        for (name, construct) in builtin_constructors() {
            let mut effect = construct();
            let defaults = effect.to_document();
            let rejected = effect.set_params(&nudged(&effect.get_params()));
            assert!(rejected.is_empty(), "{}: {:?}", name, rejected);
            effect.set_probability(0.35);
            effect.set_enabled(false);

            let doc = effect.to_document();
            assert_ne!(doc, defaults, "{} kept its defaults", name);
            assert_eq!(doc["type"], json!(name));

            let restored = registry.from_document(&doc).unwrap();
            assert_eq!(restored.to_document(), doc, "{} did not round-trip", name);
        }
    }

    #[test]
    fn test_from_document_keeps_type_defaults() {
        let registry = EffectRegistry::builtin();
        let doc = json!({"type": "GlareDampener"});
        let effect = registry.from_document(doc.as_object().unwrap()).unwrap();
        assert_eq!(effect.probability(), 1.0);
        assert!(effect.is_enabled());
    }

    #[test]
    fn test_from_document_unknown_type() {
        let registry = EffectRegistry::builtin();
        let doc = json!({"type": "SwirlEffect"});
        let err = registry.from_document(doc.as_object().unwrap()).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_EFFECT");
    }

    #[test]
    fn test_empty_registry() {
        let registry = EffectRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
