use thiserror::Error;

use crate::jobs::JobStatus;

#[derive(Error, Debug)]
pub enum ColonyError {
    // Input errors: raised before a job starts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Need at least {required} frames for a temporal window, got {actual}")]
    TooFewFrames { required: usize, actual: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} ({context})")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
        context: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    // Pipeline errors: recorded on the job as Failed.
    #[error("Predictor error: {0}")]
    Predictor(String),

    #[error("Predictor returned a {actual:?} mask for a {expected:?} frame")]
    MaskShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job {0} was cancelled")]
    Cancelled(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    // Registry and query errors.
    #[error("Job {0} already exists")]
    JobExists(String),

    #[error("Job {0} not found")]
    JobNotFound(String),

    #[error("Job {job_id} is not ready (status: {status})")]
    JobNotReady { job_id: String, status: JobStatus },

    #[error("Job {job_id} failed: {error}")]
    JobFailed { job_id: String, error: String },
}

pub type Result<T> = std::result::Result<T, ColonyError>;
