use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::point::Point;
use crate::statistic::Statistic;

/// Index of a node inside a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Position of a child inside its parent. North is the upper half (larger y).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// Depth-first traversal order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];
}

/// A rectangular region of the domain at a given depth.
///
/// A node is either a leaf holding sampled points, or split with exactly
/// four children and an empty point bag. Splitting is one-way.
#[derive(Clone, Debug)]
pub struct QuadNode {
    bounds: BoundingBox,
    depth: u32,
    value: Option<f64>,
    points: Vec<Point>,
    children: Option<[NodeId; 4]>,
}

impl QuadNode {
    fn new(bounds: BoundingBox, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            value: None,
            points: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The cached aggregate, if it has been computed.
    pub fn cached_value(&self) -> Option<f64> {
        self.value
    }

    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub fn is_split(&self) -> bool {
        self.children.is_some()
    }
}

/// Arena owning every node of a tree. Children are only ever created by
/// [`NodeArena::split`] and live as long as the arena.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<QuadNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a parentless node, typically the root.
    pub fn add_root(&mut self, bounds: BoundingBox, depth: u32) -> NodeId {
        self.push(QuadNode::new(bounds, depth))
    }

    fn push(&mut self, node: QuadNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id.0]
    }

    pub fn is_split(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_split()
    }

    pub fn depth(&self, id: NodeId) -> u32 {
        self.nodes[id.0].depth
    }

    pub fn children(&self, id: NodeId) -> Option<[NodeId; 4]> {
        self.nodes[id.0].children
    }

    pub fn child(&self, id: NodeId, quadrant: Quadrant) -> Option<NodeId> {
        self.nodes[id.0].children.map(|c| c[quadrant as usize])
    }

    pub fn point_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].points.len()
    }

    pub fn push_point(&mut self, id: NodeId, point: Point) {
        self.nodes[id.0].points.push(point);
    }

    pub fn extend_points(&mut self, id: NodeId, points: impl IntoIterator<Item = Point>) {
        self.nodes[id.0].points.extend(points);
    }

    /// Splits a leaf into four children at `depth + 1`.
    ///
    /// Each point moves into the child that strictly contains it. Points
    /// lying exactly on a midpoint line are contained by no child and are
    /// dropped. Calling this on a split node does nothing.
    pub fn split(&mut self, id: NodeId) {
        if self.nodes[id.0].is_split() {
            return;
        }
        let bounds = self.nodes[id.0].bounds;
        let depth = self.nodes[id.0].depth + 1;

        let children = Quadrant::ALL.map(|q| self.push(QuadNode::new(bounds.quadrant(q), depth)));

        let points = std::mem::take(&mut self.nodes[id.0].points);
        for p in points {
            for &child in &children {
                if self.nodes[child.0].bounds.contains_strict(p.x, p.y) {
                    self.nodes[child.0].points.push(p);
                    break;
                }
            }
        }

        self.nodes[id.0].children = Some(children);
    }

    /// Aggregate value of a node's points under `statistic`.
    ///
    /// The first successful computation is cached and returned from then on,
    /// even if the bag changes afterwards. An empty bag yields `None` and
    /// leaves the cache unset.
    pub fn value(&mut self, id: NodeId, statistic: Statistic) -> Option<f64> {
        let node = &mut self.nodes[id.0];
        if node.value.is_none() {
            let values: Vec<f64> = node.points.iter().map(|p| p.value).collect();
            node.value = statistic.compute(&values);
        }
        node.value
    }

    /// Like [`NodeArena::value`] with the statistic given by name. An
    /// unrecognized name fails before anything is cached.
    pub fn value_named(&mut self, id: NodeId, statistic: &str) -> Result<Option<f64>> {
        let statistic = statistic.parse::<Statistic>()?;
        Ok(self.value(id, statistic))
    }

    /// Leaves below `id` in depth-first NW, NE, SW, SE order.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.nodes[current.0].children {
                // Reversed so NW is popped first.
                Some(children) => stack.extend(children.iter().rev()),
                None => out.push(current),
            }
        }
        out
    }

    /// All points held below `id`, in leaf traversal order.
    pub fn collect_points(&self, id: NodeId) -> Vec<Point> {
        self.leaves(id)
            .into_iter()
            .flat_map(|leaf| self.nodes[leaf.0].points.iter().copied())
            .collect()
    }

    /// Aggregate values of the leaves below `id`, in traversal order.
    pub fn collect_values(&mut self, id: NodeId, statistic: Statistic) -> Vec<Option<f64>> {
        self.leaves(id)
            .into_iter()
            .map(|leaf| self.value(leaf, statistic))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;

    fn unit_root() -> (NodeArena, NodeId) {
        let mut arena = NodeArena::new();
        let root = arena.add_root(BoundingBox::new([0.0, 0.0], [1.0, 1.0]), 1);
        (arena, root)
    }

    #[test]
    fn test_split_creates_four_children() {
        let (mut arena, root) = unit_root();
        assert!(!arena.is_split(root));
        arena.split(root);
        assert!(arena.is_split(root));

        let children = arena.children(root).unwrap();
        let mut area = 0.0;
        for (q, &child) in Quadrant::ALL.iter().zip(children.iter()) {
            let node = arena.get(child);
            assert_eq!(node.depth(), 2);
            assert!(!node.is_split());
            assert_eq!(*node.bounds(), arena.get(root).bounds().quadrant(*q));
            area += node.bounds().area();
        }
        assert!((area - 1.0).abs() < 1e-12);

        let nw = arena.get(children[0]).bounds();
        let se = arena.get(children[3]).bounds();
        assert_eq!((nw.x_min(), nw.x_max(), nw.y_min(), nw.y_max()), (0.0, 0.5, 0.5, 1.0));
        assert_eq!((se.x_min(), se.x_max(), se.y_min(), se.y_max()), (0.5, 1.0, 0.0, 0.5));
    }

    #[test]
    fn test_split_redistributes_points() {
        let (mut arena, root) = unit_root();
        arena.push_point(root, Point::new(0.25, 0.75, 1.0)); // NW
        arena.push_point(root, Point::new(0.75, 0.75, 2.0)); // NE
        arena.push_point(root, Point::new(0.25, 0.25, 3.0)); // SW
        arena.push_point(root, Point::new(0.75, 0.25, 4.0)); // SE
        arena.push_point(root, Point::new(0.1, 0.9, 5.0)); // NW
        arena.split(root);

        assert_eq!(arena.point_count(root), 0);
        let counts: Vec<usize> = arena
            .children(root)
            .unwrap()
            .iter()
            .map(|&c| arena.point_count(c))
            .collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
    }

    // Points on a midpoint line belong to no child and are lost.
    #[test]
    fn test_split_drops_boundary_points() {
        let (mut arena, root) = unit_root();
        arena.push_point(root, Point::new(0.5, 0.25, 1.0));
        arena.push_point(root, Point::new(0.25, 0.5, 1.0));
        arena.push_point(root, Point::new(0.5, 0.5, 1.0));
        arena.push_point(root, Point::new(0.3, 0.3, 1.0));
        arena.split(root);

        let total: usize = arena
            .children(root)
            .unwrap()
            .iter()
            .map(|&c| arena.point_count(c))
            .sum();
        assert_eq!(total, 1);
        assert_eq!(arena.point_count(root), 0);
    }

    #[test]
    fn test_split_is_terminal() {
        let (mut arena, root) = unit_root();
        arena.split(root);
        let first = arena.children(root);
        arena.split(root);
        assert_eq!(arena.children(root), first);
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn test_value_is_cached_on_first_read() {
        let (mut arena, root) = unit_root();
        assert_eq!(arena.value(root, Statistic::Mean), None);
        assert_eq!(arena.get(root).cached_value(), None);

        arena.push_point(root, Point::new(0.2, 0.2, 1.0));
        arena.push_point(root, Point::new(0.4, 0.2, 3.0));
        assert_eq!(arena.value(root, Statistic::Mean), Some(2.0));

        arena.push_point(root, Point::new(0.6, 0.2, 100.0));
        assert_eq!(arena.value(root, Statistic::Mean), Some(2.0));
        assert_eq!(arena.value(root, Statistic::Median), Some(2.0));
    }

    #[test]
    fn test_value_named_unknown_leaves_cache_unset() {
        let (mut arena, root) = unit_root();
        arena.push_point(root, Point::new(0.2, 0.2, 1.0));
        let err = arena.value_named(root, "variance").unwrap_err();
        assert!(matches!(err, TreeError::UnknownStatistic(_)));
        assert_eq!(arena.get(root).cached_value(), None);

        assert_eq!(arena.value_named(root, "std").unwrap(), Some(0.0));
    }

    #[test]
    fn test_leaves_order() {
        let (mut arena, root) = unit_root();
        arena.split(root);
        let nw = arena.child(root, Quadrant::NorthWest).unwrap();
        arena.split(nw);

        let leaves = arena.leaves(root);
        assert_eq!(leaves.len(), 7);
        let nw_children = arena.children(nw).unwrap();
        assert_eq!(&leaves[..4], &nw_children[..]);
        assert_eq!(leaves[4], arena.child(root, Quadrant::NorthEast).unwrap());
        assert_eq!(leaves[6], arena.child(root, Quadrant::SouthEast).unwrap());
    }
}
