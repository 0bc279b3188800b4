use rayon::prelude::*;

use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::point::Point;

/// Bounded pool of worker threads used to fan out evaluator calls.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with exactly `num_threads` workers.
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("quadsample-worker-{}", i))
            .build()?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluates one point per seed inside `bounds` and blocks until all are
    /// done. Results keep the order of `seeds`. The first failure is returned
    /// and the remaining results are discarded.
    pub fn evaluate_batch<E: Evaluator + ?Sized>(
        &self,
        evaluator: &E,
        bounds: &BoundingBox,
        seeds: &[u64],
    ) -> Result<Vec<Point>> {
        self.pool.install(|| {
            seeds
                .par_iter()
                .map(|&seed| evaluator.evaluate(bounds, seed))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::evaluator::FnEvaluator;
    use crate::evaluators::RandomLabel;

    #[test]
    fn test_batch_matches_sequential() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.num_threads(), 4);

        let bounds = BoundingBox::new([0.0, 0.0], [2.0, 2.0]);
        let seeds: Vec<u64> = (1..=64).collect();
        let batch = pool.evaluate_batch(&RandomLabel, &bounds, &seeds).unwrap();
        let sequential: Vec<Point> = seeds
            .iter()
            .map(|&s| RandomLabel.evaluate(&bounds, s).unwrap())
            .collect();
        assert_eq!(batch, sequential);
    }

    #[test]
    fn test_batch_failure_is_fatal() {
        let pool = WorkerPool::new(2).unwrap();
        let failing = FnEvaluator(|_: &BoundingBox, seed: u64| -> Result<Point> {
            if seed == 13 {
                Err(TreeError::Evaluation(format!("seed {} diverged", seed)))
            } else {
                Ok(Point::new(0.5, 0.5, 0.0))
            }
        });
        let seeds: Vec<u64> = (1..=20).collect();
        let err = pool
            .evaluate_batch(&failing, &BoundingBox::default(), &seeds)
            .unwrap_err();
        assert!(matches!(err, TreeError::Evaluation(_)));
    }
}
