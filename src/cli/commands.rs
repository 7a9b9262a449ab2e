//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::config::AugmentConfig;
use crate::dataset::{showcase, DatasetDirs, DatasetRunner};
use crate::pipeline::Pipeline;
use crate::registry::{global, DiscoveryReport, EffectRegistry, PluginSource};

/// Discover effects from the built-in set plus `plugins` and install the result
fn load_registry(config: &AugmentConfig, plugins: &[PathBuf]) -> Arc<EffectRegistry> {
    let mut sources = config.plugin_sources();
    sources.extend(plugins.iter().cloned().map(PluginSource::Directory));
    let report = global::init(sources);
    print_skipped(&report);
    global::snapshot()
}

fn print_skipped(report: &DiscoveryReport) {
    for skipped in &report.skipped {
        warn!("Plugin skipped: {} ({})", skipped.source, skipped.reason);
    }
    for overridden in &report.overridden {
        info!(
            "{} from {} overrides {}",
            overridden.name, overridden.source, overridden.previous_source
        );
    }
}

/// List registered effect types.
pub fn list_effects(plugins: &[PathBuf]) -> Result<()> {
    let registry = load_registry(&AugmentConfig::default(), plugins);

    println!("Registered effects ({}):", registry.len());
    println!("{:-<60}", "");
    for name in registry.names() {
        let Some(effect) = registry.construct_default(name) else {
            continue;
        };
        let params = serde_json::to_string(&effect.get_params())?;
        println!(
            "{:<28} p={:<5} {} [{}]",
            name,
            effect.probability(),
            params,
            registry.source_of(name).unwrap_or("?")
        );
    }
    Ok(())
}

/// Write a new pipeline document.
pub fn new_pipeline(path: &Path, effects: &[String], copies: usize, plugins: &[PathBuf]) -> Result<()> {
    if copies == 0 {
        bail!("--copies must be at least 1");
    }
    let registry = load_registry(&AugmentConfig::default(), plugins);

    let mut pipeline = Pipeline::new();
    pipeline.set_copies_per_image(copies);
    for effect_type in effects {
        match registry.construct_default(effect_type) {
            Some(effect) => pipeline.add(effect),
            None => bail!(
                "Unknown effect type '{}'. Available: {}",
                effect_type,
                registry.names().join(", ")
            ),
        }
    }

    pipeline.save(path)?;
    println!(
        "Pipeline written: {} ({} effects, {} copies per image)",
        path.display(),
        pipeline.len(),
        pipeline.copies_per_image()
    );
    Ok(())
}

/// Options of the `run` command
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pipeline: PathBuf,
    pub dirs: DatasetDirs,
    pub config: Option<PathBuf>,
    pub plugins: Vec<PathBuf>,
    pub seed: Option<u64>,
}

/// Augment a dataset.
pub fn run(options: &RunOptions) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => AugmentConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AugmentConfig::default(),
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let registry = load_registry(&config, &options.plugins);
    let pipeline = Pipeline::load(&options.pipeline, &registry)
        .with_context(|| format!("loading pipeline {}", options.pipeline.display()))?;

    info!(
        "Running pipeline {} on {}",
        options.pipeline.display(),
        options.dirs.images.display()
    );

    let runner = DatasetRunner::new(pipeline, config);
    let mut progress = |current: usize, total: usize, message: &str| {
        println!("[{}/{}] {}", current, total, message);
    };
    let report = runner.run(&options.dirs, Some(&mut progress));

    println!("{:-<60}", "");
    println!("Copies written:   {}", report.written);
    println!("Fallbacks:        {}", report.fallbacks);
    println!("Skipped images:   {}", report.skipped_images);
    println!("Failed writes:    {}", report.failed_writes);
    Ok(())
}

/// Apply every effect alone to one image.
pub fn run_showcase(image: &Path, label: Option<&Path>, out: &Path, plugins: &[PathBuf]) -> Result<()> {
    let config = AugmentConfig::default();
    let registry = load_registry(&config, plugins);

    let entries = showcase(image, label, &registry, out, config.seed)?;

    println!("Summary:");
    for entry in &entries {
        match &entry.result {
            Ok(path) => println!("{}: OK ({})", entry.effect_type, path.display()),
            Err(reason) => println!("{}: FAILED: {}", entry.effect_type, reason),
        }
    }

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} effects failed", failed, entries.len());
    }
    Ok(())
}
