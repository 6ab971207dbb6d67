use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A single grayscale microscopy frame.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn with_index(data: Array2<f32>, frame_index: usize) -> Self {
        Self {
            data,
            metadata: FrameMetadata {
                frame_index,
                timestamp_us: None,
            },
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Where a frame sequence came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A single video container (SER).
    Video,
    /// A directory of still images, optionally with ground-truth masks.
    Dataset,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Dataset => write!(f, "dataset"),
        }
    }
}

/// Metadata about a loaded frame sequence.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub ground_truth_frames: usize,
}

/// Stretch values linearly so the minimum maps to 0 and the maximum to 1.
///
/// A constant image has no contrast to stretch and becomes all zeros.
pub fn normalize_minmax(data: &Array2<f32>) -> Array2<f32> {
    let (min, max) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if max > min {
        let range = max - min;
        data.mapv(|v| (v - min) / range)
    } else {
        Array2::zeros(data.dim())
    }
}

/// Bring a frame into [0, 1]: already-normalized data is only clamped,
/// anything exceeding 1.0 is min-max stretched.
pub fn ensure_unit_range(data: &Array2<f32>) -> Array2<f32> {
    if data.iter().any(|&v| v > 1.0) {
        normalize_minmax(data)
    } else {
        data.mapv(|v| v.clamp(0.0, 1.0))
    }
}
