use crate::bounds::BoundingBox;
use crate::point::Point;

/// Read-only view of one leaf for plotting.
#[derive(Clone, Copy, Debug)]
pub struct LeafView<'a> {
    pub bounds: BoundingBox,
    pub depth: u32,
    /// Aggregate value, `None` while the leaf holds no points.
    pub value: Option<f64>,
    pub points: &'a [Point],
}

/// Min and max over the known values, for color-scale normalization.
pub fn value_range(leaves: &[LeafView<'_>]) -> Option<(f64, f64)> {
    leaves
        .iter()
        .filter_map(|leaf| leaf.value)
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
