//! Executable transform units

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::Result;
use crate::geometry::Frame;

/// An executable image + box transform built by an [`Effect`](super::Effect)
///
/// A transform always runs when applied; the Bernoulli trial on the
/// effect's probability is the compositor's job. Randomness comes only from
/// the `rng` handed in, so a seeded caller gets reproducible output.
pub trait Transform: Send + Sync {
    /// Name used in log messages and failure reasons
    fn name(&self) -> &str;

    /// Transform the frame, moving every box with the image
    fn apply(&self, frame: Frame, rng: &mut StdRng) -> Result<Frame>;
}

/// Uniform draw from `[lo, hi]`; a degenerate range returns `lo`
pub fn uniform(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
