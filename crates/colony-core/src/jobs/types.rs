use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::SourceKind;
use crate::pipeline::AnalysisResult;

/// Lifecycle state of a job. Transitions only move forward:
/// Queued -> Running -> {Completed, Failed}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Completed | Self::Failed => 2,
        }
    }

    /// Staying put is always allowed; terminal states are final.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self == next || (!self.is_terminal() && next.rank() > self.rank())
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Coarse processing stage shown to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Upload,
    Preprocessing,
    Inference,
    Postprocessing,
    VideoGeneration,
    SavingResults,
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "Upload"),
            Self::Preprocessing => write!(f, "Preprocessing"),
            Self::Inference => write!(f, "Inference"),
            Self::Postprocessing => write!(f, "Postprocessing"),
            Self::VideoGeneration => write!(f, "Video Generation"),
            Self::SavingResults => write!(f, "Saving Results"),
        }
    }
}

/// What was submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub source_kind: SourceKind,
    pub filename: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    /// Percent complete in [0, 100].
    pub progress: f64,
    pub stage: JobStage,
    pub message: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub result: Option<AnalysisResult>,
    pub metadata: JobMetadata,
}

impl Job {
    pub(crate) fn queued(job_id: &str, metadata: JobMetadata) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.to_string(),
            status: JobStatus::Queued,
            progress: 0.0,
            stage: JobStage::Upload,
            message: "Job queued".to_string(),
            error: None,
            created_at: now,
            updated_at: now,
            result: None,
            metadata,
        }
    }

    pub fn status_view(&self) -> JobStatusView {
        JobStatusView {
            job_id: self.job_id.clone(),
            status: self.status,
            progress: self.progress,
            stage: self.stage,
            message: self.message.clone(),
            error: self.error.clone(),
        }
    }
}

/// The subset of a job exposed by status polling.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JobStatusView {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: f64,
    pub stage: JobStage,
    pub message: String,
    pub error: Option<String>,
}

/// Partial job update; only the fields that are set get merged.
#[derive(Clone, Debug, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<f64>,
    pub stage: Option<JobStage>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn stage(mut self, stage: JobStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn result(mut self, result: AnalysisResult) -> Self {
        self.result = Some(result);
        self
    }
}
