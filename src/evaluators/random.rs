use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::evaluator::{Evaluator, sample_interior};
use crate::point::Point;

/// Uniformly placed points labelled 0 or 1 with equal probability.
///
/// Useful for exercising the refinement loop: every comparison is noise.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomLabel;

impl Evaluator for RandomLabel {
    fn evaluate(&self, bounds: &BoundingBox, seed: u64) -> Result<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (x, y) = sample_interior(bounds, &mut rng)?;
        let value = if rng.gen_bool(0.5) { 1.0 } else { 0.0 };
        Ok(Point::new(x, y, value))
    }
}
