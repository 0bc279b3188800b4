use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bounds::BoundingBox;
use crate::error::{Result, TreeError};
use crate::evaluator::{Evaluator, sample_interior};
use crate::point::Point;

/// Chi-squared surface of a two-parameter model against fixed data.
///
/// A point at `(p0, p1)` gets the value
/// `sum_i w_i * (y_i - model(x_i, [p0, p1]))^2`, capped at `max_chi2` when
/// a cap is set.
pub struct Chi2Evaluator<M> {
    x: Vec<f64>,
    y: Vec<f64>,
    weights: Vec<f64>,
    model: M,
    max_chi2: Option<f64>,
}

impl<M> Chi2Evaluator<M>
where
    M: Fn(f64, [f64; 2]) -> f64 + Send + Sync,
{
    /// Creates an evaluator with unit weights.
    pub fn new(x: Vec<f64>, y: Vec<f64>, model: M) -> Result<Self> {
        if x.len() != y.len() {
            return Err(TreeError::DataLengthMismatch { expected: x.len(), found: y.len() });
        }
        let weights = vec![1.0; x.len()];
        Ok(Self { x, y, weights, model, max_chi2: None })
    }

    /// Replaces the weights, typically `1 / sigma^2` per datum.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.x.len() {
            return Err(TreeError::DataLengthMismatch {
                expected: self.x.len(),
                found: weights.len(),
            });
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_max_chi2(mut self, max_chi2: f64) -> Result<Self> {
        if !max_chi2.is_finite() || max_chi2 <= 0.0 {
            return Err(TreeError::InvalidMaxChi2(max_chi2));
        }
        self.max_chi2 = Some(max_chi2);
        Ok(self)
    }

    /// Chi-squared at the given parameters.
    pub fn chi2(&self, params: [f64; 2]) -> f64 {
        let chi2: f64 = self
            .x
            .iter()
            .zip(&self.y)
            .zip(&self.weights)
            .map(|((&x, &y), &w)| {
                let r = y - (self.model)(x, params);
                w * r * r
            })
            .sum();
        match self.max_chi2 {
            Some(cap) => chi2.min(cap),
            None => chi2,
        }
    }
}

impl<M> Evaluator for Chi2Evaluator<M>
where
    M: Fn(f64, [f64; 2]) -> f64 + Send + Sync,
{
    fn evaluate(&self, bounds: &BoundingBox, seed: u64) -> Result<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (p0, p1) = sample_interior(bounds, &mut rng)?;
        Ok(Point::new(p0, p1, self.chi2([p0, p1])))
    }
}
