use std::io::{BufRead, Write};
use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, info_span};

use crate::checkpoint;
use crate::config::TreeConfig;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::node::{NodeArena, NodeId, Quadrant};
use crate::point::Point;
use crate::pool::WorkerPool;
use crate::render::{self, LeafView};

/// Depth assigned to the root node.
pub const ROOT_DEPTH: u32 = 1;

/// Range of the per-point seeds handed to the evaluator.
const SEED_RANGE: Range<u64> = 1..100_000_000;

/// Direction along which two compared regions touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// The first region is west of the second.
    EastWest,
    /// The first region is north of the second.
    NorthSouth,
}

impl Axis {
    /// Children of the first region facing the second, and of the second
    /// facing the first, paired up along the shared edge.
    fn facing(self) -> ([Quadrant; 2], [Quadrant; 2]) {
        use Quadrant::*;
        match self {
            Axis::EastWest => ([NorthEast, SouthEast], [NorthWest, SouthWest]),
            Axis::NorthSouth => ([SouthWest, SouthEast], [NorthWest, NorthEast]),
        }
    }
}

/// Adaptive quadtree over a 2D domain.
///
/// The tree owns the evaluator and a single seed generator. All structural
/// decisions run on the calling thread; only point evaluation fans out to
/// the worker pool when `n_proc > 1`.
pub struct QuadTree<E: Evaluator> {
    config: TreeConfig,
    evaluator: E,
    arena: NodeArena,
    root: NodeId,
    rng: StdRng,
    pool: Option<WorkerPool>,
    node_count: usize,
}

impl<E: Evaluator> QuadTree<E> {
    /// Validates `config` and creates a tree with an empty root.
    pub fn new(config: TreeConfig, evaluator: E) -> Result<Self> {
        config.validate()?;

        let mut arena = NodeArena::new();
        let root = arena.add_root(config.domain, ROOT_DEPTH);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = if config.n_proc > 1 {
            Some(WorkerPool::new(config.n_proc)?)
        } else {
            None
        };

        Ok(Self {
            config,
            evaluator,
            arena,
            root,
            rng,
            pool,
            node_count: 1,
        })
    }

    /// The validated configuration the tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The evaluator producing every point.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Node storage, for read-only traversal.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// The node covering the whole domain.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Running node count for progress reporting: starts at 1 and grows by
    /// 3 per split.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Leaves in depth-first NW, NE, SW, SE order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.arena.leaves(self.root)
    }

    /// Reloads the last checkpoint if there is one, then makes `min_depth`
    /// refinement passes from the root and writes a final checkpoint.
    pub fn run(&mut self) -> Result<()> {
        if !self.load()? {
            debug!("starting from an empty root");
        }
        for pass in 0..self.config.min_depth {
            let _span = info_span!("refinement_pass", pass).entered();
            self.advance(self.root)?;
        }
        self.checkpoint()
    }

    /// One refinement pass below `id`.
    ///
    /// A split node compares its children along the four edge-sharing pairs
    /// (NW-NE, SW-SE, NW-SW, NE-SE). Diagonal pairs are never compared. A
    /// leaf shallower than `min_depth` is split unless its region is too
    /// narrow to halve. Afterwards
    /// the pass descends into the children, or tops the leaf up to
    /// `n_points`.
    pub fn advance(&mut self, id: NodeId) -> Result<()> {
        if let Some([nw, ne, sw, se]) = self.arena.children(id) {
            self.compare_nodes(nw, ne, Axis::EastWest)?;
            self.compare_nodes(sw, se, Axis::EastWest)?;
            self.compare_nodes(nw, sw, Axis::NorthSouth)?;
            self.compare_nodes(ne, se, Axis::NorthSouth)?;
        } else if self.arena.depth(id) < self.config.min_depth && self.splittable(id) {
            self.split_node(id);
            self.checkpoint()?;
        }

        match self.arena.children(id) {
            Some(children) => {
                for child in children {
                    self.advance(child)?;
                }
            }
            None => {
                let n_points = self.config.n_points;
                self.fill(id, n_points)?;
            }
        }
        Ok(())
    }

    /// Compares two regions touching along `axis`, `a` being the west (or
    /// north) one, and refines where their leaf values differ.
    ///
    /// Split regions are descended into along the shared edge until two
    /// leaves meet. Two leaves whose values differ by at least
    /// `split_threshold` are refined: each one that is no deeper than the
    /// other and below `max_depth` is split and filled, so equal-depth
    /// leaves may both split.
    pub fn compare_nodes(&mut self, a: NodeId, b: NodeId, axis: Axis) -> Result<()> {
        let (a_facing, b_facing) = axis.facing();
        match (self.arena.children(a), self.arena.children(b)) {
            (Some(a_children), Some(b_children)) => {
                for (qa, qb) in a_facing.into_iter().zip(b_facing) {
                    self.compare_nodes(a_children[qa as usize], b_children[qb as usize], axis)?;
                }
            }
            (Some(a_children), None) => {
                for qa in a_facing {
                    self.compare_nodes(a_children[qa as usize], b, axis)?;
                }
            }
            (None, Some(b_children)) => {
                for qb in b_facing {
                    self.compare_nodes(a, b_children[qb as usize], axis)?;
                }
            }
            (None, None) => self.compare_leaves(a, b)?,
        }
        Ok(())
    }

    fn compare_leaves(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let statistic = self.config.node_statistic;
        let (Some(va), Some(vb)) = (self.arena.value(a, statistic), self.arena.value(b, statistic)) else {
            debug!(?a, ?b, "skipping comparison with an empty leaf");
            return Ok(());
        };
        if (va - vb).abs() < self.config.split_threshold {
            return Ok(());
        }

        let (da, db) = (self.arena.depth(a), self.arena.depth(b));
        if da >= db && self.splittable(b) {
            self.refine_leaf(b)?;
        }
        if db >= da && self.splittable(a) {
            self.refine_leaf(a)?;
        }
        Ok(())
    }

    /// A leaf may split while below `max_depth` and while every child would
    /// still have room for a point strictly inside it.
    fn splittable(&self, id: NodeId) -> bool {
        self.arena.depth(id) < self.config.max_depth && self.arena.get(id).bounds().can_split()
    }

    fn refine_leaf(&mut self, id: NodeId) -> Result<()> {
        self.split_node(id);
        let n_points = self.config.n_points;
        self.fill(id, n_points)?;
        self.checkpoint()
    }

    fn split_node(&mut self, id: NodeId) {
        self.arena.split(id);
        self.node_count += 3;
        debug!(depth = self.arena.depth(id), nodes = self.node_count, "split node");
    }

    /// Tops every leaf below `id` up to `n_points` points.
    ///
    /// With a worker pool the missing points are evaluated as one blocking
    /// batch; otherwise one at a time. Seeds are always drawn on this thread,
    /// so both paths produce the same points for the same tree seed.
    pub fn fill(&mut self, id: NodeId, n_points: usize) -> Result<()> {
        if let Some(children) = self.arena.children(id) {
            for child in children {
                self.fill(child, n_points)?;
            }
            return Ok(());
        }

        let missing = n_points.saturating_sub(self.arena.point_count(id));
        if missing == 0 {
            return Ok(());
        }
        let bounds = *self.arena.get(id).bounds();
        debug!(depth = self.arena.depth(id), missing, "filling leaf");

        if let Some(pool) = &self.pool {
            let rng = &mut self.rng;
            let seeds: Vec<u64> = (0..missing).map(|_| rng.gen_range(SEED_RANGE)).collect();
            let points = pool.evaluate_batch(&self.evaluator, &bounds, &seeds)?;
            self.arena.extend_points(id, points);
        } else {
            while self.arena.point_count(id) < n_points {
                let seed = self.rng.gen_range(SEED_RANGE);
                let point = self.evaluator.evaluate(&bounds, seed)?;
                self.arena.push_point(id, point);
            }
        }
        Ok(())
    }

    /// Rewrites the checkpoint files, if configured, and logs progress.
    pub fn checkpoint(&mut self) -> Result<()> {
        if let Some(paths) = &self.config.checkpoint {
            checkpoint::write_files(&mut self.arena, self.root, self.config.node_statistic, paths)?;
        }
        info!(nodes = self.node_count, "progress saved");
        Ok(())
    }

    /// Restores points from the configured point file and squeezes them
    /// into shape. Returns `false` when there is nothing to load.
    ///
    /// Only an untouched tree (unsplit, empty root) is restored. Once points
    /// are present the file mirrors this tree, and rereading it would insert
    /// every point a second time.
    pub fn load(&mut self) -> Result<bool> {
        let Some(paths) = &self.config.checkpoint else {
            return Ok(false);
        };
        if !self.is_fresh() {
            debug!(nodes = self.node_count, "tree already populated, checkpoint not reloaded");
            return Ok(false);
        }
        let Some(points) = checkpoint::read_points_file(&paths.points)? else {
            info!(path = %paths.points.display(), "no checkpoint found");
            return Ok(false);
        };
        info!(path = %paths.points.display(), points = points.len(), "restoring checkpoint");
        self.insert_points(points);
        Ok(true)
    }

    fn is_fresh(&self) -> bool {
        !self.arena.is_split(self.root) && self.arena.point_count(self.root) == 0
    }

    /// Like [`QuadTree::load`], reading the point file from `reader`.
    ///
    /// The points are added to whatever the tree already holds.
    pub fn load_from_reader<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let points = checkpoint::read_points(reader)?;
        info!(points = points.len(), "restoring checkpoint");
        self.insert_points(points);
        Ok(())
    }

    /// Adds already evaluated points and squeezes the tree.
    ///
    /// Each point goes to the leaf that strictly contains it; points on an
    /// internal split line are dropped. No evaluator calls are made.
    pub fn insert_points(&mut self, points: impl IntoIterator<Item = Point>) {
        let mut dropped = 0usize;
        for p in points {
            match self.leaf_containing(&p) {
                Some(leaf) => self.arena.push_point(leaf, p),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "points on split lines dropped");
        }
        self.squeeze(self.root);
    }

    fn leaf_containing(&self, p: &Point) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(children) = self.arena.children(current) {
            current = children
                .into_iter()
                .find(|&c| self.arena.get(c).bounds().contains_strict(p.x, p.y))?;
        }
        Some(current)
    }

    /// Splits every leaf below `id` holding more than `n_points` points,
    /// down to `max_depth` or the smallest splittable region, redistributing the points it already has.
    pub fn squeeze(&mut self, id: NodeId) {
        if !self.arena.is_split(id)
            && self.arena.point_count(id) > self.config.n_points
            && self.splittable(id)
        {
            self.split_node(id);
        }
        if let Some(children) = self.arena.children(id) {
            for child in children {
                self.squeeze(child);
            }
        }
    }

    /// Writes the point file to `writer`.
    pub fn write_points<W: Write>(&self, writer: &mut W) -> Result<()> {
        checkpoint::write_points(&self.arena, self.root, writer)?;
        Ok(())
    }

    /// Writes the node file to `writer`.
    pub fn write_nodes<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        checkpoint::write_nodes(&mut self.arena, self.root, self.config.node_statistic, writer)?;
        Ok(())
    }

    /// Every leaf with its bounds, value and points, for plotting.
    pub fn leaf_views(&mut self) -> Vec<LeafView<'_>> {
        let statistic = self.config.node_statistic;
        let leaves = self.arena.leaves(self.root);
        for &leaf in &leaves {
            self.arena.value(leaf, statistic);
        }
        leaves
            .into_iter()
            .map(|leaf| {
                let node = self.arena.get(leaf);
                LeafView {
                    bounds: *node.bounds(),
                    depth: node.depth(),
                    value: node.cached_value(),
                    points: node.points(),
                }
            })
            .collect()
    }

    /// Min and max leaf value over the tree.
    pub fn value_range(&mut self) -> Option<(f64, f64)> {
        render::value_range(&self.leaf_views())
    }
}
