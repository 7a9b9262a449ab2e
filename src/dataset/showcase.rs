//! Effect showcase
//!
//! Applies every registered effect on its own, always on, to one image and
//! writes `<effect type>.png` with the resulting boxes drawn. Handy for
//! checking a plugin directory by eye.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::io::{draw_boxes, load_image};
use super::labels::read_labels;
use crate::error::{AugError, Result};
use crate::geometry::Sample;
use crate::pipeline::{Compositor, Outcome, Pipeline};
use crate::registry::EffectRegistry;

/// What happened to one effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowcaseEntry {
    pub effect_type: String,
    pub boxes: usize,
    pub result: std::result::Result<PathBuf, String>,
}

impl ShowcaseEntry {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn run_one(
    registry: &EffectRegistry,
    effect_type: &str,
    sample: &Sample,
    out_dir: &Path,
    rng: &mut StdRng,
) -> Result<(PathBuf, usize)> {
    let effect = registry
        .construct(effect_type, 1.0, true)
        .ok_or_else(|| AugError::UnknownEffect {
            effect_type: effect_type.to_string(),
        })?;
    let mut pipeline = Pipeline::new();
    pipeline.add(effect);

    // Keep every box that survives at all, to show where it went
    let compositor = Compositor::try_build(&pipeline, 0.0)?;
    let out = match compositor.apply_with_rng(sample, rng) {
        Outcome::Transformed(out) => out,
        Outcome::Fallback { reason, .. } => return Err(reason),
    };

    let path = out_dir.join(format!("{}.png", effect_type));
    draw_boxes(&out.image, &out.boxes)
        .save(&path)
        .map_err(|e| AugError::ImageEncode {
            path: path.clone(),
            source: e,
        })?;
    Ok((path, out.boxes.len()))
}

/// Render every effect of `registry` applied alone to one image
///
/// Fails only if the input cannot be loaded or `out_dir` cannot be created;
/// per-effect failures are reported in the entries.
pub fn showcase(
    image_path: &Path,
    label_path: Option<&Path>,
    registry: &EffectRegistry,
    out_dir: &Path,
    seed: Option<u64>,
) -> Result<Vec<ShowcaseEntry>> {
    let image = load_image(image_path)?;
    let boxes = match label_path {
        Some(path) => read_labels(path)?,
        None => Vec::new(),
    };
    let sample = Sample::new(image, boxes);

    fs::create_dir_all(out_dir).map_err(|e| AugError::DirectoryCreate {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut entries = Vec::new();
    for effect_type in registry.names() {
        let entry = match run_one(registry, effect_type, &sample, out_dir, &mut rng) {
            Ok((path, boxes)) => {
                log::info!("{}: OK ({} boxes)", effect_type, boxes);
                ShowcaseEntry {
                    effect_type: effect_type.to_string(),
                    boxes,
                    result: Ok(path),
                }
            }
            Err(e) => {
                log::warn!("{}: FAILED: {}", effect_type, e);
                ShowcaseEntry {
                    effect_type: effect_type.to_string(),
                    boxes: 0,
                    result: Err(e.to_string()),
                }
            }
        };
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::save_image;
    use image::{DynamicImage, Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_showcase_builtin_effects() {
        let dir = TempDir::new().unwrap();
        let image_path = dir.path().join("img_1.png");
        let label_path = dir.path().join("img_1.txt");
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 30, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, 200])
        }));
        save_image(&image, &image_path).unwrap();
        fs::write(&label_path, "0 0.5 0.5 0.3 0.3\n").unwrap();

        let out_dir = dir.path().join("Filter_Showcase");
        let registry = EffectRegistry::builtin();
        let entries = showcase(&image_path, Some(&label_path), &registry, &out_dir, Some(1)).unwrap();

        assert_eq!(entries.len(), registry.len());
        for entry in &entries {
            assert!(entry.is_ok(), "{} failed: {:?}", entry.effect_type, entry.result);
        }
        assert!(out_dir.join("HorizontalFlipEffect.png").is_file());
        let flip = entries
            .iter()
            .find(|e| e.effect_type == "HorizontalFlipEffect")
            .unwrap();
        assert_eq!(flip.boxes, 1);
    }

    #[test]
    fn test_showcase_missing_image() {
        let dir = TempDir::new().unwrap();
        let err = showcase(
            &dir.path().join("missing.png"),
            None,
            &EffectRegistry::builtin(),
            dir.path(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
