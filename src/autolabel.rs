//! Auto-labeling
//!
//! Writes label files from a detector's predictions. The detector itself
//! (model loading, inference, confidence filtering) lives outside this
//! crate behind the [`Detector`] trait.

use std::fs;
use std::path::Path;

use image::DynamicImage;
use serde::Serialize;

use crate::config::AugmentConfig;
use crate::dataset::{label_path_for, list_images, load_image, write_labels};
use crate::error::{AugError, Result};
use crate::geometry::BoundingBox;

/// Anything that can find labeled boxes in an image
pub trait Detector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoLabelReport {
    /// Label files written
    pub labeled: usize,
    /// Images that already had a label file
    pub skipped_existing: usize,
    /// Images that could not be loaded or detected
    pub failed: usize,
    /// Total boxes written
    pub boxes: usize,
}

/// Label every image in `images_dir` that has no label file yet
///
/// With `overwrite`, existing label files are replaced too. Detections with
/// invalid geometry are dropped.
pub fn auto_label(
    detector: &dyn Detector,
    images_dir: &Path,
    labels_dir: &Path,
    overwrite: bool,
) -> Result<AutoLabelReport> {
    let images = list_images(images_dir, &AugmentConfig::default())?;
    fs::create_dir_all(labels_dir).map_err(|e| AugError::DirectoryCreate {
        path: labels_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = AutoLabelReport::default();
    for image_path in images {
        let label_path = label_path_for(&image_path, labels_dir);
        if label_path.exists() && !overwrite {
            report.skipped_existing += 1;
            continue;
        }

        let detections = load_image(&image_path).and_then(|image| detector.detect(&image));
        let boxes: Vec<BoundingBox> = match detections {
            Ok(boxes) => boxes
                .into_iter()
                .filter(|b| match b.validate() {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("{}: dropping detection: {}", image_path.display(), e);
                        false
                    }
                })
                .collect(),
            Err(e) => {
                log::warn!("Auto-label failed for {}: {}", image_path.display(), e);
                report.failed += 1;
                continue;
            }
        };

        match write_labels(&label_path, &boxes) {
            Ok(()) => {
                report.labeled += 1;
                report.boxes += boxes.len();
            }
            Err(e) => {
                log::warn!("{}", e);
                report.failed += 1;
            }
        }
    }

    log::info!(
        "Auto-labeled {} images ({} boxes), {} already labeled, {} failed",
        report.labeled,
        report.boxes,
        report.skipped_existing,
        report.failed
    );
    Ok(report)
}
