//! Augforge - Pluggable Image Augmentation for Object Detection Datasets
//!
//! Augforge expands a labeled dataset by running every image through an
//! ordered, serializable chain of effects while keeping the YOLO bounding
//! boxes in sync with the pixels.
//!
//! # Architecture
//!
//! - Registry: discovers effect types from the built-in set and plugin
//!   definition files
//! - Pipeline: ordered effect instances plus run settings, saved as JSON
//! - Compositor: the executable plan built from the enabled effects
//! - Dataset runner: applies the compositor across an images/labels pair
//!   and writes the augmented copies

pub mod autolabel;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod registry;

pub use config::AugmentConfig;
pub use effects::{Effect, Transform};
pub use error::{AugError, Result};
pub use geometry::{BoundingBox, Sample};
pub use pipeline::{Compositor, Outcome, Pipeline, PipelineDocument};
pub use registry::{EffectRegistry, PluginSource};
