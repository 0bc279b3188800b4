/// A sampled `(x, y, value)` triple.
///
/// Points are produced by an [`Evaluator`](crate::Evaluator) and owned by
/// exactly one leaf at a time; splitting moves them into the children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }
}
