use rand::Rng;

use crate::bounds::BoundingBox;
use crate::error::{Result, TreeError};
use crate::point::Point;

/// Trait defining how a point is produced inside a region.
///
/// Implementations draw `(x, y)` strictly inside `bounds` from a generator
/// seeded with `seed`, then compute the value. Calls must be independent of
/// each other: the tree may issue them concurrently from a worker pool.
/// An `Err` aborts the run that issued the call.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, bounds: &BoundingBox, seed: u64) -> Result<Point>;
}

/// Adapts a closure into an [`Evaluator`].
pub struct FnEvaluator<F>(pub F);

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&BoundingBox, u64) -> Result<Point> + Send + Sync,
{
    fn evaluate(&self, bounds: &BoundingBox, seed: u64) -> Result<Point> {
        (self.0)(bounds, seed)
    }
}

/// Redraws before falling back to the midpoint; only regions a few ulps wide
/// ever need more than one draw.
const MAX_DRAWS: usize = 64;

/// Draws a coordinate pair uniformly from the strict interior of `bounds`.
///
/// Fails with [`TreeError::EmptyRegion`] when no `f64` lies strictly inside
/// one of the axes.
pub fn sample_interior<R: Rng + ?Sized>(bounds: &BoundingBox, rng: &mut R) -> Result<(f64, f64)> {
    if !bounds.has_interior() {
        return Err(TreeError::EmptyRegion {
            x_min: bounds.x_min(),
            x_max: bounds.x_max(),
            y_min: bounds.y_min(),
            y_max: bounds.y_max(),
        });
    }
    Ok((
        sample_open(rng, bounds.min[0], bounds.max[0]),
        sample_open(rng, bounds.min[1], bounds.max[1]),
    ))
}

// `gen_range` is half-open and may round onto `hi` for narrow ranges.
fn sample_open<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    for _ in 0..MAX_DRAWS {
        let v = rng.gen_range(lo..hi);
        if lo < v && v < hi {
            return v;
        }
    }
    0.5 * (lo + hi)
}
