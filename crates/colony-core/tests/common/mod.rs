use std::path::PathBuf;

use ndarray::Array2;

use colony_core::error::{ColonyError, Result};
use colony_core::flow::FeatureTensor;
use colony_core::frame::{Frame, SourceInfo, SourceKind};
use colony_core::io::ser::SER_HEADER_SIZE;
use colony_core::io::FrameSequence;
use colony_core::mask::{BinaryMask, ProbabilityMask};
use colony_core::pipeline::Predictor;

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC (8 bytes each)
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Build a complete synthetic mono 8-bit SER file with the given frame data.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header_full(width, height, 8, frames.len(), 0);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Horizontal intensity ramp in [0, 1].
pub fn ramp_frame(h: usize, w: usize) -> Frame {
    let denom = (w.max(2) - 1) as f32;
    Frame::new(Array2::from_shape_fn((h, w), |(_, c)| c as f32 / denom))
}

/// `n` copies of the same ramp frame with sequential indices.
pub fn identical_frames(n: usize, h: usize, w: usize) -> Vec<Frame> {
    let base = ramp_frame(h, w);
    (0..n)
        .map(|i| Frame::with_index(base.data.clone(), i))
        .collect()
}

/// Smooth Gaussian spot with peak 1.0 centered at (cy, cx).
pub fn gaussian_spot(h: usize, w: usize, cy: f32, cx: f32, sigma: f32) -> Array2<f32> {
    let s2 = 2.0 * sigma * sigma;
    Array2::from_shape_fn((h, w), |(r, c)| {
        let dy = r as f32 - cy;
        let dx = c as f32 - cx;
        (-(dx * dx + dy * dy) / s2).exp()
    })
}

/// Filled disk mask.
pub fn disk_mask(h: usize, w: usize, cy: f64, cx: f64, radius: f64) -> BinaryMask {
    Array2::from_shape_fn((h, w), |(r, c)| {
        let dy = r as f64 - cy;
        let dx = c as f64 - cx;
        dx * dx + dy * dy <= radius * radius
    })
}

/// Filled axis-aligned rectangle mask covering rows `r0..r0+rh`, cols `c0..c0+cw`.
pub fn rect_mask(h: usize, w: usize, r0: usize, c0: usize, rh: usize, cw: usize) -> BinaryMask {
    Array2::from_shape_fn((h, w), |(r, c)| {
        r >= r0 && r < r0 + rh && c >= c0 && c < c0 + cw
    })
}

pub fn mask_to_prob(mask: &BinaryMask, fg: f32, bg: f32) -> ProbabilityMask {
    mask.mapv(|v| if v { fg } else { bg })
}

pub fn sequence_from_frames(frames: Vec<Frame>, ground_truth: Option<Vec<BinaryMask>>) -> FrameSequence {
    let (h, w) = frames.first().map(|f| f.dim()).unwrap_or((0, 0));
    FrameSequence {
        source: SourceInfo {
            path: PathBuf::from("synthetic"),
            kind: SourceKind::Dataset,
            total_frames: frames.len(),
            width: w as u32,
            height: h as u32,
            bit_depth: 8,
            ground_truth_frames: ground_truth.as_ref().map_or(0, |g| g.len()),
        },
        frames,
        ground_truth,
    }
}

/// Predicts the same probability everywhere.
pub struct ConstantPredictor(pub f32);

impl Predictor for ConstantPredictor {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, features: &FeatureTensor) -> Result<ProbabilityMask> {
        Ok(Array2::from_elem((features.height(), features.width()), self.0))
    }
}

/// Always fails.
pub struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn name(&self) -> &str {
        "failing"
    }

    fn predict(&self, _features: &FeatureTensor) -> Result<ProbabilityMask> {
        Err(ColonyError::Predictor("model exploded".into()))
    }
}

/// Returns a mask one row short of the input.
pub struct WrongShapePredictor;

impl Predictor for WrongShapePredictor {
    fn name(&self) -> &str {
        "wrong-shape"
    }

    fn predict(&self, features: &FeatureTensor) -> Result<ProbabilityMask> {
        Ok(Array2::ones((features.height().saturating_sub(1), features.width())))
    }
}

/// Sleeps before every prediction so a job stays in flight.
pub struct SlowPredictor(pub std::time::Duration);

impl Predictor for SlowPredictor {
    fn name(&self) -> &str {
        "slow"
    }

    fn predict(&self, features: &FeatureTensor) -> Result<ProbabilityMask> {
        std::thread::sleep(self.0);
        Ok(Array2::ones((features.height(), features.width())))
    }
}
