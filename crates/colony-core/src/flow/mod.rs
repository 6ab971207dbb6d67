pub mod farneback;
pub mod features;
pub mod poly_expansion;
pub mod pyramid;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FLOW_ITERATIONS, DEFAULT_FLOW_WINDOW, DEFAULT_POLY_N, DEFAULT_POLY_SIGMA,
    DEFAULT_PYR_LEVELS, DEFAULT_PYR_SCALE,
};
use crate::error::{ColonyError, Result};

pub use farneback::estimate_flow;
pub use features::{build_feature_tensor, to_byte_domain, FeatureTensor};

use self::pyramid::resize_bilinear;

/// Parameters of the pyramidal polynomial-expansion flow estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowParams {
    /// Scale between consecutive pyramid layers, in (0, 1).
    #[serde(default = "default_pyr_scale")]
    pub pyr_scale: f64,
    /// Coarser layers built below full resolution.
    #[serde(default = "default_levels")]
    pub levels: usize,
    /// Averaging window for the displacement solve.
    #[serde(default = "default_win_size")]
    pub win_size: usize,
    /// Refinement iterations per layer.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Polynomial expansion neighborhood radius.
    #[serde(default = "default_poly_n")]
    pub poly_n: usize,
    /// Gaussian sigma of the expansion applicability.
    #[serde(default = "default_poly_sigma")]
    pub poly_sigma: f64,
}

fn default_pyr_scale() -> f64 {
    DEFAULT_PYR_SCALE
}
fn default_levels() -> usize {
    DEFAULT_PYR_LEVELS
}
fn default_win_size() -> usize {
    DEFAULT_FLOW_WINDOW
}
fn default_iterations() -> usize {
    DEFAULT_FLOW_ITERATIONS
}
fn default_poly_n() -> usize {
    DEFAULT_POLY_N
}
fn default_poly_sigma() -> f64 {
    DEFAULT_POLY_SIGMA
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            pyr_scale: DEFAULT_PYR_SCALE,
            levels: DEFAULT_PYR_LEVELS,
            win_size: DEFAULT_FLOW_WINDOW,
            iterations: DEFAULT_FLOW_ITERATIONS,
            poly_n: DEFAULT_POLY_N,
            poly_sigma: DEFAULT_POLY_SIGMA,
        }
    }
}

impl FlowParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.pyr_scale > 0.0 && self.pyr_scale < 1.0) {
            return Err(ColonyError::InvalidConfig(format!(
                "flow.pyr_scale must be in (0, 1), got {}",
                self.pyr_scale
            )));
        }
        if self.win_size == 0 {
            return Err(ColonyError::InvalidConfig("flow.win_size must be >= 1".into()));
        }
        if self.iterations == 0 {
            return Err(ColonyError::InvalidConfig("flow.iterations must be >= 1".into()));
        }
        if self.poly_n == 0 {
            return Err(ColonyError::InvalidConfig("flow.poly_n must be >= 1".into()));
        }
        if self.poly_sigma <= 0.0 {
            return Err(ColonyError::InvalidConfig(format!(
                "flow.poly_sigma must be positive, got {}",
                self.poly_sigma
            )));
        }
        Ok(())
    }
}

/// Dense motion field: horizontal and vertical displacement per pixel.
#[derive(Clone, Debug)]
pub struct FlowField {
    pub dx: Array2<f32>,
    pub dy: Array2<f32>,
}

impl FlowField {
    pub fn zeros(h: usize, w: usize) -> Self {
        Self {
            dx: Array2::zeros((h, w)),
            dy: Array2::zeros((h, w)),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dx.dim()
    }

    /// Resample to a finer layer and rescale displacements by `factor`.
    pub fn upscaled(&self, h: usize, w: usize, factor: f32) -> Self {
        Self {
            dx: resize_bilinear(&self.dx, h, w).mapv(|v| v * factor),
            dy: resize_bilinear(&self.dy, h, w).mapv(|v| v * factor),
        }
    }

    /// Mean displacement over the whole field, as (dx, dy).
    pub fn mean(&self) -> (f64, f64) {
        let n = self.dx.len().max(1) as f64;
        let sx: f64 = self.dx.iter().map(|&v| v as f64).sum();
        let sy: f64 = self.dy.iter().map(|&v| v as f64).sum();
        (sx / n, sy / n)
    }
}
