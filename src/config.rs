//! Run configuration for a [`QuadTree`](crate::QuadTree).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::{Result, TreeError};
use crate::statistic::Statistic;

/// Files a tree rewrites on every checkpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointPaths {
    /// Leaf-ordered point samples; also the file read back on reload.
    pub points: PathBuf,
    /// One summary row per leaf.
    pub nodes: PathBuf,
}

impl Default for CheckpointPaths {
    fn default() -> Self {
        Self {
            points: PathBuf::from("points.txt"),
            nodes: PathBuf::from("nodes.txt"),
        }
    }
}

/// Refinement settings. Missing JSON fields take the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Domain covered by the root node.
    pub domain: BoundingBox,
    /// Minimum absolute difference between neighboring leaf values that
    /// triggers a split.
    pub split_threshold: f64,
    /// Aggregation used for node values.
    pub node_statistic: Statistic,
    /// Target number of points per leaf.
    pub n_points: usize,
    /// Leaves shallower than this are split unconditionally. Also the number
    /// of refinement passes made by `run`.
    pub min_depth: u32,
    /// Leaves at this depth are never split.
    pub max_depth: u32,
    /// Number of evaluator workers; 1 evaluates sequentially.
    pub n_proc: usize,
    /// Seed of the generator that hands out per-point seeds. `None` seeds
    /// from entropy.
    pub seed: Option<u64>,
    /// Where checkpoints go. `None` keeps everything in memory.
    pub checkpoint: Option<CheckpointPaths>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            domain: BoundingBox::default(),
            split_threshold: 0.2,
            node_statistic: Statistic::Mean,
            n_points: 20,
            min_depth: 3,
            max_depth: 6,
            n_proc: 1,
            seed: None,
            checkpoint: None,
        }
    }
}

impl TreeConfig {
    /// Default settings over the given domain.
    pub fn with_domain(domain: BoundingBox) -> Self {
        Self { domain, ..Default::default() }
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// An unrecognized `node_statistic` name is reported as
    /// [`TreeError::UnknownStatistic`], as when parsing a [`Statistic`] name.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if let Some(name) = value.get("node_statistic").and_then(serde_json::Value::as_str) {
            name.parse::<Statistic>()?;
        }
        let config: TreeConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every construction-time constraint.
    pub fn validate(&self) -> Result<()> {
        self.domain.validate()?;
        if !self.split_threshold.is_finite() || self.split_threshold <= 0.0 {
            return Err(TreeError::InvalidSplitThreshold(self.split_threshold));
        }
        if self.n_points == 0 {
            return Err(TreeError::InvalidPointsPerNode(self.n_points));
        }
        if self.max_depth < self.min_depth {
            return Err(TreeError::InvalidDepthRange {
                min: self.min_depth,
                max: self.max_depth,
            });
        }
        if self.n_proc == 0 {
            return Err(TreeError::InvalidWorkerCount(self.n_proc));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TreeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.split_threshold, 0.2);
        assert_eq!(config.node_statistic, Statistic::Mean);
        assert_eq!(config.n_points, 20);
        assert_eq!((config.min_depth, config.max_depth), (3, 6));
        assert_eq!(config.n_proc, 1);
    }

    #[test]
    fn test_validation_errors() {
        let bad = TreeConfig { split_threshold: 0.0, ..Default::default() };
        assert!(matches!(bad.validate(), Err(TreeError::InvalidSplitThreshold(_))));

        let bad = TreeConfig { split_threshold: f64::NAN, ..Default::default() };
        assert!(matches!(bad.validate(), Err(TreeError::InvalidSplitThreshold(_))));

        let bad = TreeConfig { n_points: 0, ..Default::default() };
        assert!(matches!(bad.validate(), Err(TreeError::InvalidPointsPerNode(0))));

        let bad = TreeConfig { min_depth: 4, max_depth: 3, ..Default::default() };
        assert!(matches!(bad.validate(), Err(TreeError::InvalidDepthRange { min: 4, max: 3 })));

        let bad = TreeConfig { n_proc: 0, ..Default::default() };
        assert!(matches!(bad.validate(), Err(TreeError::InvalidWorkerCount(0))));

        let bad = TreeConfig::with_domain(BoundingBox::new([0.0, 1.0], [1.0, 1.0]));
        assert!(matches!(bad.validate(), Err(TreeError::InvertedBounds { axis: 'y', .. })));
    }

    #[test]
    fn test_from_json_str() {
        let config = TreeConfig::from_json_str(
            r#"{
                "domain": { "min": [0.5, 0.0], "max": [2.5, 5.0] },
                "split_threshold": 0.5,
                "node_statistic": "median",
                "checkpoint": { "points": "chi2_points.txt", "nodes": "chi2_nodes.txt" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.split_threshold, 0.5);
        assert_eq!(config.node_statistic, Statistic::Median);
        assert_eq!(config.n_points, 20);
        assert_eq!(config.domain.max, [2.5, 5.0]);
        assert_eq!(config.checkpoint.unwrap().points, PathBuf::from("chi2_points.txt"));
    }

    #[test]
    fn test_from_json_str_rejects_unknown_statistic() {
        let err = TreeConfig::from_json_str(r#"{ "node_statistic": "mode" }"#).unwrap_err();
        assert!(matches!(err, TreeError::UnknownStatistic(ref name) if name == "mode"));

        // Wrong types are still plain JSON errors.
        let err = TreeConfig::from_json_str(r#"{ "node_statistic": 3 }"#).unwrap_err();
        assert!(matches!(err, TreeError::Json(_)));

        let err = TreeConfig::from_json_str(r#"{ "max_depth": 1 }"#).unwrap_err();
        assert!(matches!(err, TreeError::InvalidDepthRange { min: 3, max: 1 }));
    }
}
