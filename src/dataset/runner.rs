//! Dataset runner
//!
//! Drives the compositor over every image of a dataset, `copies_per_image`
//! times each, and writes the augmented image and label files. Nothing that
//! goes wrong with a single image or copy stops the run; problems are
//! logged and counted in the [`RunReport`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::io::{label_path_for, list_images, load_image, save_image};
use super::labels::{read_labels, write_labels};
use super::naming::OutputNamer;
use crate::config::AugmentConfig;
use crate::error::{AugError, Result};
use crate::geometry::Sample;
use crate::pipeline::{Compositor, Outcome, Pipeline};

/// Progress callback: `(current, total, message)`
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize, &str);

/// Source and destination directories of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDirs {
    pub images: PathBuf,
    pub labels: PathBuf,
    pub out_images: PathBuf,
    pub out_labels: PathBuf,
}

impl DatasetDirs {
    pub fn new(
        images: impl Into<PathBuf>,
        labels: impl Into<PathBuf>,
        out_images: impl Into<PathBuf>,
        out_labels: impl Into<PathBuf>,
    ) -> Self {
        Self {
            images: images.into(),
            labels: labels.into(),
            out_images: out_images.into(),
            out_labels: out_labels.into(),
        }
    }
}

/// Counts collected during a run
///
/// `written` counts copies whose image and label file were both written,
/// including copies that fell back to the original sample; `fallbacks`
/// counts those separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub images: usize,
    pub written: usize,
    pub fallbacks: usize,
    pub skipped_images: usize,
    pub failed_writes: usize,
    pub cancelled: bool,
}

impl RunReport {
    /// Copies written from a completed compositor run
    pub fn augmented(&self) -> usize {
        self.written.saturating_sub(self.fallbacks)
    }
}

/// Applies a pipeline to a dataset
#[derive(Debug, Clone)]
pub struct DatasetRunner {
    pipeline: Pipeline,
    config: AugmentConfig,
}

impl DatasetRunner {
    /// Create a runner over a snapshot of `pipeline`
    pub fn new(pipeline: Pipeline, config: AugmentConfig) -> Self {
        Self { pipeline, config }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run on the calling thread
    ///
    /// Always returns a report; `report.written` is the number of copies
    /// produced.
    pub fn run(&self, dirs: &DatasetDirs, progress: Option<ProgressFn<'_>>) -> RunReport {
        let cancel = AtomicBool::new(false);
        self.run_until(dirs, progress, &cancel)
    }

    /// Run on a background thread
    ///
    /// The worker owns its own copy of the pipeline, so the caller may keep
    /// editing theirs.
    pub fn spawn<F>(self, dirs: DatasetDirs, mut progress: Option<F>) -> Result<RunHandle>
    where
        F: FnMut(usize, usize, &str) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let thread = thread::Builder::new()
            .name("augforge-runner".to_string())
            .spawn(move || {
                let callback = progress
                    .as_mut()
                    .map(|f| f as &mut dyn FnMut(usize, usize, &str));
                self.run_until(&dirs, callback, &worker_cancel)
            })?;
        Ok(RunHandle { cancel, thread })
    }

    fn run_until(
        &self,
        dirs: &DatasetDirs,
        mut progress: Option<ProgressFn<'_>>,
        cancel: &AtomicBool,
    ) -> RunReport {
        let mut report = RunReport::default();
        if !self.pipeline.is_enabled() {
            log::info!("Pipeline disabled, nothing to do");
            return report;
        }

        for dir in [&dirs.out_images, &dirs.out_labels] {
            if let Err(e) = fs::create_dir_all(dir) {
                let err = AugError::DirectoryCreate {
                    path: dir.to_path_buf(),
                    source: e,
                };
                log::warn!("Aborting run: {}", err);
                return report;
            }
        }

        let images = match list_images(&dirs.images, &self.config) {
            Ok(images) => images,
            Err(e) => {
                log::warn!("Aborting run: {}", e);
                return report;
            }
        };
        report.images = images.len();

        let compositor = self.pipeline.compose(self.config.min_visibility);
        let copies = self.pipeline.copies_per_image();
        let total = images.len() * copies;
        let mut rng = self.rng();
        let mut namer = OutputNamer::new();

        log::info!(
            "Augmenting {} images x {} copies with {} effects",
            images.len(),
            copies,
            compositor.step_names().len()
        );

        'images: for (index, image_path) in images.iter().enumerate() {
            let sample = match self.load_sample(image_path, &dirs.labels) {
                Ok(sample) => sample,
                Err(e) => {
                    log::warn!("Skipping image: {}", e);
                    report.skipped_images += 1;
                    continue;
                }
            };
            let file_name = image_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for copy in 0..copies {
                if cancel.load(Ordering::Relaxed) {
                    log::info!("Run cancelled");
                    report.cancelled = true;
                    break 'images;
                }

                let outcome = compositor.apply_with_rng(&sample, &mut rng);
                match self.write_copy(&outcome, copy, image_path, dirs, &mut namer) {
                    Ok(()) => {
                        report.written += 1;
                        if outcome.is_fallback() {
                            report.fallbacks += 1;
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to write copy {} of {}: {}", copy, file_name, e);
                        report.failed_writes += 1;
                    }
                }

                if let Some(callback) = progress.as_mut() {
                    let current = index * copies + copy + 1;
                    callback(current, total, &format!("Augmenting {}", file_name));
                }
            }
        }

        log::info!(
            "Run finished: {} copies written ({} fell back), {} images skipped, {} failed writes",
            report.written,
            report.fallbacks,
            report.skipped_images,
            report.failed_writes
        );
        report
    }

    fn load_sample(&self, image_path: &Path, labels_dir: &Path) -> Result<Sample> {
        let image = load_image(image_path)?;
        let label_path = label_path_for(image_path, labels_dir);
        let boxes = match read_labels(&label_path) {
            Ok(boxes) => boxes,
            Err(e) => {
                log::warn!("Treating {} as unlabeled: {}", image_path.display(), e);
                Vec::new()
            }
        };
        Ok(Sample::new(image, boxes))
    }

    fn write_copy(
        &self,
        outcome: &Outcome,
        copy: usize,
        source: &Path,
        dirs: &DatasetDirs,
        namer: &mut OutputNamer,
    ) -> Result<()> {
        let name = namer.next(copy, source);
        let image_path = dirs.out_images.join(&name.image);
        let label_path = dirs.out_labels.join(&name.label);
        let sample = outcome.sample();

        save_image(&sample.image, &image_path)?;
        if let Err(e) = write_labels(&label_path, &sample.boxes) {
            // An image without its label file would read as a background sample
            let _ = fs::remove_file(&image_path);
            return Err(e);
        }
        Ok(())
    }

    /// Run the compositor once on a single image without writing anything
    ///
    /// A missing label file means no boxes.
    pub fn preview(&self, image_path: &Path, label_path: &Path) -> Result<Outcome> {
        let image = load_image(image_path)?;
        let boxes = read_labels(label_path)?;
        let compositor = Compositor::build(&self.pipeline, self.config.min_visibility);
        Ok(compositor.apply_with_rng(&Sample::new(image, boxes), &mut self.rng()))
    }
}

/// Handle to a run on a background thread
pub struct RunHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Ask the worker to stop before its next copy
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and return its report
    pub fn join(self) -> Result<RunReport> {
        self.thread.join().map_err(|_| AugError::Worker {
            reason: "runner thread panicked".to_string(),
        })
    }
}
