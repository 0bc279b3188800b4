//! Error types for tree construction, refinement and checkpointing.

/// Errors raised by `quadsample`.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Invalid {axis} bounds: [{min}, {max}] (min must be < max)")]
    InvertedBounds { axis: char, min: f64, max: f64 },

    #[error("Invalid {axis} bounds: [{min}, {max}] (must be finite)")]
    NonFiniteBounds { axis: char, min: f64, max: f64 },

    #[error("Invalid split threshold: {0} (must be finite and > 0.0)")]
    InvalidSplitThreshold(f64),

    #[error("Invalid node statistic: {0} (must be one of: mean, median, std)")]
    UnknownStatistic(String),

    #[error("Invalid points per node: {0} (must be > 0)")]
    InvalidPointsPerNode(usize),

    #[error("Invalid depth range: min_depth {min} > max_depth {max}")]
    InvalidDepthRange { min: u32, max: u32 },

    #[error("Invalid worker count: {0} (must be >= 1)")]
    InvalidWorkerCount(usize),

    #[error("Invalid worker count: {0} (JS evaluators run on the calling thread; must be 1)")]
    WorkersUnsupported(usize),

    #[error("Region x = [{x_min}, {x_max}], y = [{y_min}, {y_max}] has no interior at f64 resolution")]
    EmptyRegion { x_min: f64, x_max: f64, y_min: f64, y_max: f64 },

    #[error("Evaluator is not callable")]
    EvaluatorNotCallable,

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Malformed checkpoint at line {line}: {reason}")]
    MalformedCheckpoint { line: usize, reason: String },

    #[error("Data length mismatch: expected {expected}, found {found}")]
    DataLengthMismatch { expected: usize, found: usize },

    #[error("Invalid chi-squared cap: {0} (must be finite and > 0.0)")]
    InvalidMaxChi2(f64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TreeError>;
