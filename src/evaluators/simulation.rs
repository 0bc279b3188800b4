use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::evaluator::{Evaluator, sample_interior};
use crate::point::Point;

/// Runs an external simulation at a uniformly drawn parameter pair.
///
/// The simulation gets the parameters and a generator seeded from the point
/// seed, so any internal randomness (initial phases, perturbations) is
/// reproducible. Typical values are outcome labels such as 1 for a stable
/// N-body configuration and 0 for an unstable one. A simulation error is
/// returned unchanged and aborts the run.
pub struct SimulationEvaluator<F> {
    simulation: F,
}

impl<F> SimulationEvaluator<F>
where
    F: Fn([f64; 2], &mut StdRng) -> Result<f64> + Send + Sync,
{
    pub fn new(simulation: F) -> Self {
        Self { simulation }
    }
}

impl<F> Evaluator for SimulationEvaluator<F>
where
    F: Fn([f64; 2], &mut StdRng) -> Result<f64> + Send + Sync,
{
    fn evaluate(&self, bounds: &BoundingBox, seed: u64) -> Result<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (x, y) = sample_interior(bounds, &mut rng)?;
        let value = (self.simulation)([x, y], &mut rng)?;
        Ok(Point::new(x, y, value))
    }
}
