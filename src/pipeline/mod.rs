//! Augmentation pipeline
//!
//! An ordered list of effects ([`Pipeline`]), its persisted form
//! ([`PipelineDocument`]) and the executable plan built from it
//! ([`Compositor`]).

mod chain;
mod compositor;
mod document;

pub use chain::{Pipeline, DEFAULT_COPIES_PER_IMAGE};
pub use compositor::{Compositor, Outcome, DEFAULT_MIN_VISIBILITY};
pub use document::PipelineDocument;
