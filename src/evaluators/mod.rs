//! Reference [`Evaluator`](crate::Evaluator) strategies.
//!
//! Each strategy captures its inputs immutably, so one instance can serve
//! every worker of a parallel fill.

mod chi2;
mod random;
mod simulation;

pub use chi2::Chi2Evaluator;
pub use random::RandomLabel;
pub use simulation::SimulationEvaluator;
