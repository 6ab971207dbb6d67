pub mod analyze;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod predictor;
pub mod types;

pub use analyze::{analyze_sequence, analyze_window};
pub use config::AnalysisConfig;
pub use metrics::{metrics_rows, AnalysisResult, MetricsRow, MetricsSeries};
pub use orchestrator::{run_job, JobContext, RegistryReporter};
pub use predictor::{CenterIntensityPredictor, Predictor};
pub use types::{FrameRecord, NoOpReporter, PipelineStage, ProgressReporter, SeriesAnalysis};
