use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::{Component, PhenotypeCounts};
use crate::jobs::JobStage;
use crate::mask::BinaryMask;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Preprocessing,
    Inference,
    Postprocessing,
    VideoGeneration,
    SavingResults,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocessing => write!(f, "Loading frames"),
            Self::Inference => write!(f, "Creating temporal windows"),
            Self::Postprocessing => write!(f, "Detecting division events"),
            Self::VideoGeneration => write!(f, "Generating overlay frames"),
            Self::SavingResults => write!(f, "Saving metrics"),
        }
    }
}

impl PipelineStage {
    /// Job progress range, in percent, covered by this stage.
    pub fn progress_range(self) -> (f64, f64) {
        match self {
            Self::Preprocessing => (5.0, 10.0),
            Self::Inference => (10.0, 60.0),
            Self::Postprocessing => (65.0, 70.0),
            Self::VideoGeneration => (70.0, 90.0),
            Self::SavingResults => (95.0, 100.0),
        }
    }

    pub fn job_stage(self) -> JobStage {
        match self {
            Self::Preprocessing => JobStage::Preprocessing,
            Self::Inference => JobStage::Inference,
            Self::Postprocessing => JobStage::Postprocessing,
            Self::VideoGeneration => JobStage::VideoGeneration,
            Self::SavingResults => JobStage::SavingResults,
        }
    }

    /// Progress message for `done` of `total` items.
    pub fn item_message(self, done: usize, total: usize) -> String {
        match self {
            Self::Inference => format!("Inference: frame {done}/{total}"),
            Self::VideoGeneration => format!("Rendering: frame {done}/{total}"),
            other => format!("{other}: {done}/{total}"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, job state, or logging.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., window count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` work items within the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Measurements for one analyzed (window-center) frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Position among analyzed frames, starting at 0.
    pub frame: usize,
    /// Index of the window's center in the input sequence.
    pub center_index: usize,
    pub biomass: usize,
    pub components: Vec<Component>,
    pub phenotype_counts: PhenotypeCounts,
    /// Log growth relative to the previous analyzed frame; 0 for the first.
    pub growth_rate: f64,
    /// Set after the whole series has been scanned.
    pub division_like: bool,
    /// Ground-truth foreground area at the center frame, when supplied.
    pub area_gt: Option<usize>,
}

impl FrameRecord {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Output of analyzing a whole sequence.
#[derive(Clone, Debug)]
pub struct SeriesAnalysis {
    /// One record per temporal window, in window order.
    pub records: Vec<FrameRecord>,
    /// Cleaned prediction mask per record.
    pub masks: Vec<BinaryMask>,
    /// Record indices flagged as division-like.
    pub division_events: BTreeSet<usize>,
}

impl SeriesAnalysis {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn biomass(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.biomass).collect()
    }
}
