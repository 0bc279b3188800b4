use crate::bounds::BoundingBox;
use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::evaluator::{Evaluator, sample_interior};
use crate::point::Point;
use crate::statistic::Statistic;
use crate::tree::QuadTree;
use js_sys::Function;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(typescript_custom_section)]
const TS_EVALUATOR: &'static str = r#"
export type PointEvaluator = (x: number, y: number, seed: number) => number;
"#;

/// Axis-aligned domain of a tree.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct Domain2D {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[wasm_bindgen]
impl Domain2D {
    #[wasm_bindgen(constructor)]
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Domain2D {
        Domain2D { x_min, x_max, y_min, y_max }
    }
}

impl From<Domain2D> for BoundingBox {
    fn from(d: Domain2D) -> Self {
        BoundingBox::new([d.x_min, d.y_min], [d.x_max, d.y_max])
    }
}

/// Refinement options; the constructor yields the defaults.
///
/// `n_proc` must stay 1: a JS callback can only be invoked from the thread
/// that owns it.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub split_threshold: f64,
    pub n_points: usize,
    pub min_depth: u32,
    pub max_depth: u32,
    pub n_proc: usize,
    statistic: Statistic,
    seed: Option<u64>,
}

#[wasm_bindgen]
impl RunOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RunOptions {
        let defaults = TreeConfig::default();
        RunOptions {
            split_threshold: defaults.split_threshold,
            n_points: defaults.n_points,
            min_depth: defaults.min_depth,
            max_depth: defaults.max_depth,
            n_proc: defaults.n_proc,
            statistic: defaults.node_statistic,
            seed: defaults.seed,
        }
    }

    /// Sets the node statistic by name: `mean`, `median` or `std`.
    #[wasm_bindgen(js_name = setStatistic)]
    pub fn set_statistic(&mut self, name: &str) -> std::result::Result<(), JsError> {
        self.statistic = name.parse()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setSeed)]
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RunOptions {
    fn to_config(self, domain: BoundingBox) -> Result<TreeConfig> {
        if self.n_proc != 1 {
            return Err(TreeError::WorkersUnsupported(self.n_proc));
        }
        Ok(TreeConfig {
            domain,
            split_threshold: self.split_threshold,
            node_statistic: self.statistic,
            n_points: self.n_points,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            n_proc: self.n_proc,
            seed: self.seed,
            checkpoint: None,
        })
    }
}

struct JsEvaluator {
    func: Function,
}

// `RunOptions::to_config` only admits one worker, so the callback is always
// invoked on the thread that created it.
unsafe impl Send for JsEvaluator {}
unsafe impl Sync for JsEvaluator {}

impl JsEvaluator {
    fn new(val: JsValue) -> Result<Self> {
        let func = val.dyn_into::<Function>().map_err(|_| TreeError::EvaluatorNotCallable)?;
        Ok(JsEvaluator { func })
    }
}

impl Evaluator for JsEvaluator {
    fn evaluate(&self, bounds: &BoundingBox, seed: u64) -> Result<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (x, y) = sample_interior(bounds, &mut rng)?;
        let res = self
            .func
            .call3(&JsValue::NULL, &x.into(), &y.into(), &(seed as f64).into())
            .map_err(|e| TreeError::Evaluation(format!("evaluator threw: {:?}", e)))?;
        let value = res
            .as_f64()
            .ok_or_else(|| TreeError::Evaluation(format!("evaluator returned {:?}, expected a number", res)))?;
        Ok(Point::new(x, y, value))
    }
}

#[wasm_bindgen(js_name = QuadTree)]
pub struct QuadTreeWASM {
    inner: QuadTree<JsEvaluator>,
}

#[wasm_bindgen(js_class = QuadTree)]
impl QuadTreeWASM {
    #[wasm_bindgen(constructor)]
    pub fn new(
        domain: Domain2D,
        options: &RunOptions,
        evaluator: JsValue,
    ) -> std::result::Result<QuadTreeWASM, JsError> {
        let config = options.to_config(domain.into())?;
        let inner = QuadTree::new(config, JsEvaluator::new(evaluator)?)?;
        Ok(QuadTreeWASM { inner })
    }

    pub fn run(&mut self) -> std::result::Result<(), JsError> {
        self.inner.run()?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    #[wasm_bindgen(getter)]
    pub fn leaf_count(&self) -> usize {
        self.inner.leaves().len()
    }

    /// Leaf rectangles as `[x_min, x_max, y_min, y_max, ...]`.
    #[wasm_bindgen(js_name = leafBounds)]
    pub fn leaf_bounds(&mut self) -> Vec<f64> {
        self.inner
            .leaf_views()
            .iter()
            .flat_map(|leaf| {
                let b = leaf.bounds;
                [b.x_min(), b.x_max(), b.y_min(), b.y_max()]
            })
            .collect()
    }

    /// Leaf values, `NaN` where unknown.
    #[wasm_bindgen(js_name = leafValues)]
    pub fn leaf_values(&mut self) -> Vec<f64> {
        self.inner
            .leaf_views()
            .iter()
            .map(|leaf| leaf.value.unwrap_or(f64::NAN))
            .collect()
    }

    #[wasm_bindgen(js_name = leafDepths)]
    pub fn leaf_depths(&mut self) -> Vec<u32> {
        self.inner.leaf_views().iter().map(|leaf| leaf.depth).collect()
    }

    /// `[min, max]` over leaf values, empty if none is known.
    #[wasm_bindgen(js_name = valueRange)]
    pub fn value_range(&mut self) -> Vec<f64> {
        match self.inner.value_range() {
            Some((lo, hi)) => vec![lo, hi],
            None => Vec::new(),
        }
    }

    #[wasm_bindgen(js_name = pointsText)]
    pub fn points_text(&self) -> std::result::Result<String, JsError> {
        let mut out = Vec::new();
        self.inner.write_points(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[wasm_bindgen(js_name = nodesText)]
    pub fn nodes_text(&mut self) -> std::result::Result<String, JsError> {
        let mut out = Vec::new();
        self.inner.write_nodes(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Restores points from a previously exported point file.
    #[wasm_bindgen(js_name = loadPointsText)]
    pub fn load_points_text(&mut self, text: &str) -> std::result::Result<(), JsError> {
        self.inner.load_from_reader(text.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_require_single_worker() {
        let domain = BoundingBox::default();
        let config = RunOptions::new().to_config(domain).unwrap();
        assert_eq!(config.n_proc, 1);
        assert_eq!(config.checkpoint, None);

        let options = RunOptions { n_proc: 4, ..RunOptions::new() };
        assert!(matches!(
            options.to_config(domain),
            Err(TreeError::WorkersUnsupported(4))
        ));
    }
}
