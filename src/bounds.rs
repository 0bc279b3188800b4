use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::node::Quadrant;

/// Axis-aligned rectangle in the 2D parameter domain.
///
/// `min` holds `[x_min, y_min]` and `max` holds `[x_max, y_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from `x_min, x_max, y_min, y_max`, rejecting
    /// inverted, degenerate or non-finite limits.
    pub fn try_new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        let bounds = Self::new([x_min, y_min], [x_max, y_max]);
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks that both axes are finite and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        for (axis, name) in ['x', 'y'].into_iter().enumerate() {
            let (min, max) = (self.min[axis], self.max[axis]);
            if !min.is_finite() || !max.is_finite() {
                return Err(TreeError::NonFiniteBounds { axis: name, min, max });
            }
            if min >= max {
                return Err(TreeError::InvertedBounds { axis: name, min, max });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn x_min(&self) -> f64 {
        self.min[0]
    }

    #[inline]
    pub fn x_max(&self) -> f64 {
        self.max[0]
    }

    #[inline]
    pub fn y_min(&self) -> f64 {
        self.min[1]
    }

    #[inline]
    pub fn y_max(&self) -> f64 {
        self.max[1]
    }

    /// Horizontal and vertical midpoints.
    #[inline]
    pub fn center(&self) -> [f64; 2] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ]
    }

    pub fn area(&self) -> f64 {
        (self.max[0] - self.min[0]) * (self.max[1] - self.min[1])
    }

    /// Strict interior test: points on an edge are not contained.
    #[inline]
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        self.min[0] < x && x < self.max[0] && self.min[1] < y && y < self.max[1]
    }

    /// Whether some `f64` pair lies strictly inside on both axes.
    pub fn has_interior(&self) -> bool {
        let [cx, cy] = self.center();
        self.contains_strict(cx, cy)
    }

    /// Whether all four quadrants keep an interior, so a split cannot produce
    /// a region no point can be drawn from.
    pub fn can_split(&self) -> bool {
        Quadrant::ALL.iter().all(|&q| self.quadrant(q).has_interior())
    }

    /// The rectangle covered by one quadrant after splitting at the midpoints.
    /// North is the upper half (larger y).
    pub fn quadrant(&self, quadrant: Quadrant) -> BoundingBox {
        let [cx, cy] = self.center();
        match quadrant {
            Quadrant::NorthWest => BoundingBox::new([self.min[0], cy], [cx, self.max[1]]),
            Quadrant::NorthEast => BoundingBox::new([cx, cy], [self.max[0], self.max[1]]),
            Quadrant::SouthWest => BoundingBox::new([self.min[0], self.min[1]], [cx, cy]),
            Quadrant::SouthEast => BoundingBox::new([cx, self.min[1]], [self.max[0], cy]),
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new([0.0, 0.0], [1.0, 1.0])
    }
}
