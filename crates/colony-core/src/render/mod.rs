//! Persisted artifacts of a job: per-frame images, overlay video, metrics.

pub mod caption;
pub mod csv_export;
pub mod directory;
pub mod overlay;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::Frame;
use crate::mask::BinaryMask;
use crate::pipeline::{AnalysisResult, FrameRecord, MetricsRow};

pub use directory::DirectoryRenderer;

/// Everything needed to draw one analyzed frame.
pub struct FrameArtifacts<'a> {
    pub record: &'a FrameRecord,
    /// The window's center frame, normalized to [0, 1].
    pub frame: &'a Frame,
    pub pred_mask: &'a BinaryMask,
    pub gt_mask: Option<&'a BinaryMask>,
    pub fps: f64,
}

/// Where the artifacts of one frame were written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameArtifactRefs {
    pub index: usize,
    pub orig: Option<PathBuf>,
    pub gt: Option<PathBuf>,
    pub pred: Option<PathBuf>,
    pub triplet: Option<PathBuf>,
}

/// Sink for rendered frames and exported tables.
pub trait Renderer: Send {
    fn render_frame(&mut self, artifacts: &FrameArtifacts<'_>) -> Result<FrameArtifactRefs>;

    /// Assemble the frames rendered so far into a video.
    fn finish_video(&mut self) -> Result<Option<PathBuf>>;

    fn write_metrics(&mut self, rows: &[MetricsRow]) -> Result<Option<PathBuf>>;

    /// Persist the final result payload.
    fn write_summary(&mut self, _result: &AnalysisResult) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Renderer that persists nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_frame(&mut self, artifacts: &FrameArtifacts<'_>) -> Result<FrameArtifactRefs> {
        Ok(FrameArtifactRefs {
            index: artifacts.record.frame,
            ..Default::default()
        })
    }

    fn finish_video(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn write_metrics(&mut self, _rows: &[MetricsRow]) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}
