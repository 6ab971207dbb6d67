use ndarray::Array2;

use crate::error::Result;
use crate::flow::FeatureTensor;
use crate::mask::ProbabilityMask;

/// Segmentation model: feature tensor in, per-pixel foreground probability out.
///
/// The returned mask must have the tensor's spatial shape and values in [0, 1].
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureTensor) -> Result<ProbabilityMask>;
}

/// Baseline predictor: the window's center intensity used directly as the
/// foreground probability. With `invert`, dark objects on a bright
/// background become foreground.
#[derive(Clone, Debug, Default)]
pub struct CenterIntensityPredictor {
    pub invert: bool,
}

impl CenterIntensityPredictor {
    pub fn new(invert: bool) -> Self {
        Self { invert }
    }
}

impl Predictor for CenterIntensityPredictor {
    fn name(&self) -> &str {
        "center-intensity"
    }

    fn predict(&self, features: &FeatureTensor) -> Result<ProbabilityMask> {
        let center = features.center_intensity();
        let prob: Array2<f32> = if self.invert {
            center.mapv(|v| (1.0 - v).clamp(0.0, 1.0))
        } else {
            center.mapv(|v| v.clamp(0.0, 1.0))
        };
        Ok(prob)
    }
}
