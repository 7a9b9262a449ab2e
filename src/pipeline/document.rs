//! Pipeline configuration document
//!
//! ```json
//! {
//!   "enabled": true,
//!   "augmentations_per_image": 5,
//!   "effects": [ { "type": "BlurEffect", "probability": 0.5, "enabled": true, "blur_limit": 7 } ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::chain::{Pipeline, DEFAULT_COPIES_PER_IMAGE};
use crate::effects::ParamMap;
use crate::error::{AugError, Result};
use crate::registry::EffectRegistry;

fn default_enabled() -> bool {
    true
}

fn default_copies() -> usize {
    DEFAULT_COPIES_PER_IMAGE
}

/// Persisted form of a [`Pipeline`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_copies")]
    pub augmentations_per_image: usize,
    #[serde(default)]
    pub effects: Vec<ParamMap>,
}

impl Default for PipelineDocument {
    fn default() -> Self {
        Self {
            enabled: true,
            augmentations_per_image: DEFAULT_COPIES_PER_IMAGE,
            effects: Vec::new(),
        }
    }
}

impl PipelineDocument {
    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Pipeline {
    /// Snapshot the pipeline as a document
    pub fn to_document(&self) -> PipelineDocument {
        PipelineDocument {
            enabled: self.is_enabled(),
            augmentations_per_image: self.copies_per_image(),
            effects: self.iter().map(|e| e.to_document()).collect(),
        }
    }

    /// Rebuild a pipeline from a document
    ///
    /// Effects whose type is not in `registry` are dropped with a warning;
    /// everything else round-trips exactly.
    pub fn from_document(doc: &PipelineDocument, registry: &EffectRegistry) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.set_enabled(doc.enabled);
        pipeline.set_copies_per_image(doc.augmentations_per_image);

        for (index, effect_doc) in doc.effects.iter().enumerate() {
            match registry.from_document(effect_doc) {
                Ok(effect) => pipeline.add(effect),
                Err(e) => log::warn!("Dropping effect #{} from pipeline document: {}", index, e),
            }
        }
        pipeline
    }

    /// Write the pipeline document to `path` as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_document().to_json()?;
        fs::write(path, json).map_err(|e| AugError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Saved pipeline ({} effects) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a pipeline document from `path`
    pub fn load(path: &Path, registry: &EffectRegistry) -> Result<Self> {
        if !path.exists() {
            return Err(AugError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| AugError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let doc = PipelineDocument::from_json(&text)?;
        let pipeline = Self::from_document(&doc, registry);
        log::info!("Loaded pipeline ({} effects) from {}", pipeline.len(), path.display());
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{BlurEffect, EffectParams, GlareDampener, RotateEffect};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new();
        pipeline.set_copies_per_image(3);
        pipeline.add(Box::new(RotateEffect::new(30, EffectParams::new(0.7, true))));
        pipeline.add(Box::new(BlurEffect::new(8, EffectParams::new(0.2, false))));
        pipeline.add(Box::new(GlareDampener::default()));
        pipeline
    }

    #[test]
    fn test_document_shape() {
        let doc = sample_pipeline().to_document();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["enabled"], json!(true));
        assert_eq!(value["augmentations_per_image"], json!(3));
        assert_eq!(
            value["effects"][1],
            json!({"type": "BlurEffect", "probability": 0.2, "enabled": false, "blur_limit": 8})
        );
    }

    #[test]
    fn test_round_trip() {
        let registry = EffectRegistry::builtin();
        let original = sample_pipeline().to_document();
        let restored = Pipeline::from_document(&original, &registry).to_document();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_unknown_types_dropped() {
        let registry = EffectRegistry::builtin();
        let doc = PipelineDocument::from_json(
            r#"{"enabled": false, "augmentations_per_image": 2, "effects": [
                {"type": "SwirlEffect", "probability": 0.5, "enabled": true},
                {"type": "VerticalFlipEffect", "probability": 1.0, "enabled": true},
                {"probability": 0.5}
            ]}"#,
        )
        .unwrap();

        let pipeline = Pipeline::from_document(&doc, &registry);
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.get(0).unwrap().effect_type(), "VerticalFlipEffect");
        assert!(!pipeline.is_enabled());
        assert_eq!(pipeline.copies_per_image(), 2);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let doc = PipelineDocument::from_json(r#"{"effects": [{"type": "BlurEffect"}]}"#).unwrap();
        assert!(doc.enabled);
        assert_eq!(doc.augmentations_per_image, 5);

        let pipeline = Pipeline::from_document(&doc, &EffectRegistry::builtin());
        let blur = pipeline.get(0).unwrap();
        assert_eq!(blur.probability(), 0.5);
        assert!(blur.is_enabled());
    }

    #[test]
    fn test_bad_parameter_keeps_default() {
        let doc = PipelineDocument::from_json(
            r#"{"effects": [{"type": "RotateEffect", "limit": "wide", "probability": "0.9"}]}"#,
        )
        .unwrap();
        let pipeline = Pipeline::from_document(&doc, &EffectRegistry::builtin());
        let rotate = pipeline.get(0).unwrap();
        assert_eq!(rotate.get_params()["limit"], json!(15));
        assert_eq!(rotate.probability(), 0.9);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.json");
        let pipeline = sample_pipeline();
        pipeline.save(&path).unwrap();

        let loaded = Pipeline::load(&path, &EffectRegistry::builtin()).unwrap();
        assert_eq!(loaded.to_document(), pipeline.to_document());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Pipeline::load(Path::new("/nonexistent/pipeline.json"), &EffectRegistry::builtin())
            .unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
