//! # quadsample
//!
//! `quadsample` is a Rust library for adaptive sampling of expensive 2D functions, designed to be
//! used in Rust as well as compiled to WebAssembly (WASM). It refines a quadtree over a rectangular
//! domain wherever neighboring regions disagree, so evaluations concentrate along the features of
//! the response instead of being spread uniformly.
//!
//! ## Features
//!
//! - **Neighbor-driven refinement**: Leaves sharing an edge are compared and split when their aggregate values differ by more than a threshold.
//! - **Pluggable evaluators**: Anything implementing [`Evaluator`] can be sampled; closures, χ² fits and seeded simulations are provided.
//! - **Parallel evaluation**: Point evaluations fan out over a `rayon` pool while all tree decisions stay on one thread.
//! - **Checkpoints**: Progress is rewritten to plain text files after every split and can be resumed without re-evaluating.
//! - **WASM-first**: Built with `wasm-bindgen`, the tree can sample a JavaScript callback.
//!
//! ## Example
//!
//! ```no_run
//! use quadsample::{BoundingBox, QuadTree, RandomLabel, TreeConfig};
//!
//! let mut config = TreeConfig::with_domain(BoundingBox::new([0.0, 0.0], [1.0, 1.0]));
//! config.seed = Some(42);
//! let mut tree = QuadTree::new(config, RandomLabel)?;
//! tree.run()?;
//! for leaf in tree.leaf_views() {
//!     println!("{:?} depth {} value {:?}", leaf.bounds, leaf.depth, leaf.value);
//! }
//! # Ok::<(), quadsample::TreeError>(())
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`QuadTree`] struct, which owns the nodes, the evaluator and the
//! seed generator.

mod bounds;
pub mod checkpoint;
mod config;
mod error;
mod evaluator;
pub mod evaluators;
mod node;
mod point;
mod pool;
mod render;
mod statistic;
mod tree;
pub mod wasm;

pub use bounds::BoundingBox;
pub use config::CheckpointPaths;
pub use config::TreeConfig;
pub use error::Result;
pub use error::TreeError;
pub use evaluator::Evaluator;
pub use evaluator::FnEvaluator;
pub use evaluator::sample_interior;
pub use evaluators::Chi2Evaluator;
pub use evaluators::RandomLabel;
pub use evaluators::SimulationEvaluator;
pub use node::NodeArena;
pub use node::NodeId;
pub use node::QuadNode;
pub use node::Quadrant;
pub use point::Point;
pub use pool::WorkerPool;
pub use render::LeafView;
pub use render::value_range;
pub use statistic::Statistic;
pub use tree::Axis;
pub use tree::QuadTree;
pub use tree::ROOT_DEPTH;
