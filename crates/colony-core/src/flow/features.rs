use ndarray::{s, Array2, Array3, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{ColonyError, Result};
use crate::frame::Frame;
use crate::temporal::TemporalWindow;

use super::farneback::estimate_flow;
use super::{FlowField, FlowParams};

/// Multi-channel model input for one temporal window, shape (C, H, W).
///
/// Channel order: the `W` raw intensities in window order, then for each
/// consecutive pair `(i, i+1)` its horizontal and vertical motion channels.
#[derive(Clone, Debug)]
pub struct FeatureTensor {
    pub data: Array3<f32>,
    window_len: usize,
}

impl FeatureTensor {
    /// Number of channels produced for a window of `window_len` frames.
    pub fn channel_count(window_len: usize) -> usize {
        window_len + 2 * window_len.saturating_sub(1)
    }

    pub fn channels(&self) -> usize {
        self.data.dim().0
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Raw intensity channel of window frame `i`.
    pub fn intensity(&self, i: usize) -> ArrayView2<'_, f32> {
        self.data.slice(s![i, .., ..])
    }

    /// The window's center frame intensities.
    pub fn center_intensity(&self) -> ArrayView2<'_, f32> {
        self.intensity(self.window_len / 2)
    }

    /// (horizontal, vertical) motion channels between frames `pair` and `pair + 1`.
    pub fn motion(&self, pair: usize) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        let base = self.window_len + 2 * pair;
        (
            self.data.slice(s![base, .., ..]),
            self.data.slice(s![base + 1, .., ..]),
        )
    }
}

/// Rescale [0, 1] intensities to the 8-bit domain the flow estimator expects:
/// multiply by 255, round, clip.
pub fn to_byte_domain(data: &Array2<f32>) -> Array2<f32> {
    data.mapv(|v| (v * 255.0).round().clamp(0.0, 255.0))
}

/// Build the feature tensor for one temporal window.
///
/// Fails only when the frames do not share one shape.
pub fn build_feature_tensor(window: &TemporalWindow<'_>, params: &FlowParams) -> Result<FeatureTensor> {
    build_feature_tensor_from_frames(window.frames, params)
}

/// Build the feature tensor for an explicit run of frames.
pub fn build_feature_tensor_from_frames(frames: &[Frame], params: &FlowParams) -> Result<FeatureTensor> {
    let Some(first) = frames.first() else {
        return Err(ColonyError::EmptySequence);
    };
    let (h, w) = first.dim();
    for frame in frames.iter().skip(1) {
        if frame.dim() != (h, w) {
            return Err(ColonyError::ShapeMismatch {
                expected: (h, w),
                actual: frame.dim(),
                context: format!("window frame {}", frame.metadata.frame_index),
            });
        }
    }

    let bytes: Vec<Array2<f32>> = frames.iter().map(|f| to_byte_domain(&f.data)).collect();
    let flows: Vec<FlowField> = (0..frames.len().saturating_sub(1))
        .into_par_iter()
        .map(|i| estimate_flow(&bytes[i], &bytes[i + 1], params))
        .collect::<Result<_>>()?;

    let window_len = frames.len();
    let mut data = Array3::<f32>::zeros((FeatureTensor::channel_count(window_len), h, w));
    for (i, frame) in frames.iter().enumerate() {
        data.slice_mut(s![i, .., ..]).assign(&frame.data);
    }
    for (pair, flow) in flows.iter().enumerate() {
        let base = window_len + 2 * pair;
        data.slice_mut(s![base, .., ..]).assign(&flow.dx);
        data.slice_mut(s![base + 1, .., ..]).assign(&flow.dy);
    }

    debug!(channels = data.dim().0, height = h, width = w, "Built feature tensor");
    Ok(FeatureTensor { data, window_len })
}
