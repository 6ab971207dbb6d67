use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::PhenotypeRules;
use crate::consts::{
    DEFAULT_EROSION_KERNEL, DEFAULT_FPS, DEFAULT_MIN_AREA, DEFAULT_THRESHOLD, DEFAULT_WINDOW_SIZE,
    INFERENCE_PROGRESS_DIVISIONS,
};
use crate::division::DivisionParams;
use crate::error::{ColonyError, Result};
use crate::flow::FlowParams;
use crate::mask::CleanParams;

/// Everything that shapes one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Frames per temporal window. Must be odd.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_min_area")]
    pub min_area: usize,
    /// Elliptical erosion kernel size; 0 skips erosion.
    #[serde(default = "default_erosion_kernel")]
    pub erosion_kernel: usize,
    /// Playback rate of the analyzed sequence, used for time stamps.
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Analyze windows in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Windows per progress update. Defaults to a twentieth of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_chunk: Option<usize>,
    #[serde(default)]
    pub flow: FlowParams,
    #[serde(default)]
    pub phenotype: PhenotypeRules,
    #[serde(default)]
    pub division: DivisionParams,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
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
fn default_fps() -> f64 {
    DEFAULT_FPS
}
fn default_parallel() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            threshold: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
            erosion_kernel: DEFAULT_EROSION_KERNEL,
            fps: DEFAULT_FPS,
            parallel: true,
            progress_chunk: None,
            flow: FlowParams::default(),
            phenotype: PhenotypeRules::default(),
            division: DivisionParams::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(ColonyError::InvalidConfig(format!(
                "window_size must be a positive odd number, got {}",
                self.window_size
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ColonyError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if self.progress_chunk == Some(0) {
            return Err(ColonyError::InvalidConfig("progress_chunk must be >= 1".into()));
        }
        self.clean_params().validate()?;
        self.flow.validate()?;
        self.phenotype.validate()?;
        self.division.validate()?;
        Ok(())
    }

    pub fn clean_params(&self) -> CleanParams {
        CleanParams {
            threshold: self.threshold,
            min_area: self.min_area,
            erosion_kernel: self.erosion_kernel,
        }
    }

    /// Windows per progress update for a run of `total` windows.
    pub fn chunk_size(&self, total: usize) -> usize {
        self.progress_chunk
            .unwrap_or(total / INFERENCE_PROGRESS_DIVISIONS)
            .max(1)
    }
}
