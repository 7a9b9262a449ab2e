//! Compositor
//!
//! Turns a pipeline into one executable plan. Applying the plan:
//! 1. validates the input boxes,
//! 2. runs every step in pipeline order, each behind its own Bernoulli
//!    trial on the effect's probability,
//! 3. drops boxes below the minimum visibility after every step.
//!
//! Any failure, at build time or while applying, yields the untouched
//! input as [`Outcome::Fallback`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::chain::Pipeline;
use crate::effects::Transform;
use crate::error::{AugError, Result};
use crate::geometry::Sample;

/// Minimum retained area fraction used when none is configured
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.3;

struct Step {
    effect_type: String,
    probability: f64,
    transform: Box<dyn Transform>,
}

enum Plan {
    Ready(Vec<Step>),
    Broken { effect_type: String, reason: String },
}

/// Result of applying the compositor to one sample
#[derive(Debug)]
pub enum Outcome {
    /// The plan ran to completion (possibly with every step skipped)
    Transformed(Sample),
    /// The plan failed; `sample` is the input, unchanged
    Fallback { sample: Sample, reason: AugError },
}

impl Outcome {
    pub fn sample(&self) -> &Sample {
        match self {
            Outcome::Transformed(sample) => sample,
            Outcome::Fallback { sample, .. } => sample,
        }
    }

    pub fn into_sample(self) -> Sample {
        match self {
            Outcome::Transformed(sample) => sample,
            Outcome::Fallback { sample, .. } => sample,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }
}

/// Executable form of a pipeline
pub struct Compositor {
    plan: Plan,
    min_visibility: f64,
}

impl Compositor {
    /// Build the plan, failing on the first effect that cannot build
    pub fn try_build(pipeline: &Pipeline, min_visibility: f64) -> Result<Self> {
        let mut steps = Vec::new();
        if pipeline.is_enabled() {
            for effect in pipeline.enabled_effects() {
                let transform = effect.build_transform()?;
                steps.push(Step {
                    effect_type: effect.effect_type().to_string(),
                    probability: effect.probability(),
                    transform,
                });
            }
        }
        Ok(Self {
            plan: Plan::Ready(steps),
            min_visibility,
        })
    }

    /// Build the plan; a build failure turns every later `apply` into a fallback
    pub fn build(pipeline: &Pipeline, min_visibility: f64) -> Self {
        match Self::try_build(pipeline, min_visibility) {
            Ok(compositor) => compositor,
            Err(e) => {
                let effect_type = pipeline
                    .enabled_effects()
                    .find(|effect| effect.build_transform().is_err())
                    .map(|effect| effect.effect_type().to_string())
                    .unwrap_or_default();
                log::warn!("Pipeline cannot be built, samples will pass through: {}", e);
                Self {
                    plan: Plan::Broken {
                        effect_type,
                        reason: e.to_string(),
                    },
                    min_visibility,
                }
            }
        }
    }

    /// Apply with a freshly seeded random source
    pub fn apply(&self, sample: &Sample) -> Outcome {
        let mut rng = StdRng::from_entropy();
        self.apply_with_rng(sample, &mut rng)
    }

    /// Apply with the caller's random source
    pub fn apply_with_rng(&self, sample: &Sample, rng: &mut StdRng) -> Outcome {
        match self.run(sample, rng) {
            Ok(out) => Outcome::Transformed(out),
            Err(reason) => {
                log::warn!("Augmentation failed, keeping original sample: {}", reason);
                Outcome::Fallback {
                    sample: sample.clone(),
                    reason,
                }
            }
        }
    }

    fn run(&self, sample: &Sample, rng: &mut StdRng) -> Result<Sample> {
        let steps = match &self.plan {
            Plan::Ready(steps) => steps,
            Plan::Broken {
                effect_type,
                reason,
            } => {
                return Err(AugError::TransformFailed {
                    effect_type: effect_type.clone(),
                    reason: reason.clone(),
                })
            }
        };
        if steps.is_empty() {
            return Ok(sample.clone());
        }

        let mut frame = sample.to_frame()?;
        for step in steps {
            if rng.gen::<f64>() >= step.probability {
                continue;
            }
            frame = step.transform.apply(frame, rng)?;
            let dropped = frame.retain_visible(self.min_visibility);
            if dropped > 0 {
                log::debug!(
                    "{} dropped {} box(es) below visibility {}",
                    step.effect_type,
                    dropped,
                    self.min_visibility
                );
            }
        }
        Ok(frame.into_sample())
    }

    pub fn min_visibility(&self) -> f64 {
        self.min_visibility
    }

    /// Effect types in execution order (empty when the plan is broken)
    pub fn step_names(&self) -> Vec<&str> {
        match &self.plan {
            Plan::Ready(steps) => steps.iter().map(|s| s.effect_type.as_str()).collect(),
            Plan::Broken { .. } => Vec::new(),
        }
    }

    /// True when the pipeline built successfully
    pub fn is_ready(&self) -> bool {
        matches!(self.plan, Plan::Ready(_))
    }
}

impl Pipeline {
    /// Build a compositor over the current state of this pipeline
    pub fn compose(&self, min_visibility: f64) -> Compositor {
        Compositor::build(self, min_visibility)
    }
}
