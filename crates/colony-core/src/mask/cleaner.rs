use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_EROSION_KERNEL, DEFAULT_MIN_AREA, DEFAULT_THRESHOLD};
use crate::error::{ColonyError, Result};

use super::components::label_components;
use super::morphology::{ellipse_kernel, erode};
use super::{BinaryMask, ProbabilityMask};

/// Parameters turning a probability map into a clean binary mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleanParams {
    /// Pixels strictly above this probability are foreground.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Connected components smaller than this are dropped.
    #[serde(default = "default_min_area")]
    pub min_area: usize,
    /// Elliptical erosion kernel size; 0 skips erosion.
    #[serde(default = "default_erosion_kernel")]
    pub erosion_kernel: usize,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}
fn default_min_area() -> usize {
    DEFAULT_MIN_AREA
}
fn default_erosion_kernel() -> usize {
    DEFAULT_EROSION_KERNEL
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
            erosion_kernel: DEFAULT_EROSION_KERNEL,
        }
    }
}

impl CleanParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ColonyError::InvalidConfig(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Foreground wherever `prob > threshold`.
pub fn threshold_mask(prob: &ProbabilityMask, threshold: f32) -> BinaryMask {
    prob.mapv(|v| v > threshold)
}

/// Clear every 8-connected component with fewer than `min_area` pixels.
pub fn remove_small_components(mask: &BinaryMask, min_area: usize) -> BinaryMask {
    if min_area == 0 {
        return mask.clone();
    }
    let components = label_components(mask);
    let keep: Vec<bool> = std::iter::once(false)
        .chain(components.stats.iter().map(|s| s.area >= min_area))
        .collect();
    components.labels.mapv(|l| keep[l as usize])
}

/// Threshold, drop small components, then erode once.
///
/// Component filtering happens on the raw thresholded mask, before erosion
/// can split or shrink regions.
pub fn clean_mask(prob: &ProbabilityMask, params: &CleanParams) -> BinaryMask {
    let binary = threshold_mask(prob, params.threshold);
    let filtered = remove_small_components(&binary, params.min_area);
    let cleaned = if params.erosion_kernel > 0 {
        erode(&filtered, &ellipse_kernel(params.erosion_kernel))
    } else {
        filtered
    };
    debug!(
        foreground = count_foreground(&cleaned),
        threshold = params.threshold,
        min_area = params.min_area,
        "Cleaned mask"
    );
    cleaned
}

pub fn count_foreground(mask: &Array2<bool>) -> usize {
    mask.iter().filter(|&&v| v).count()
}
