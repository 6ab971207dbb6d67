use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use crate::error::{ColonyError, Result};
use crate::io::FrameSequence;
use crate::pipeline::{run_job, AnalysisConfig, AnalysisResult, JobContext, Predictor};
use crate::render::DirectoryRenderer;

use super::registry::{CancellationToken, JobRegistry};
use super::types::{Job, JobMetadata, JobStatus, JobStatusView};

/// A job to run.
pub struct JobRequest {
    pub job_id: String,
    pub sequence: FrameSequence,
    pub config: AnalysisConfig,
}

/// Handle to a submitted job's worker thread.
pub struct JobHandle {
    pub job_id: String,
    thread: JoinHandle<Result<AnalysisResult>>,
}

impl JobHandle {
    /// Block until the worker finishes.
    pub fn join(self) -> Result<AnalysisResult> {
        self.thread.join().unwrap_or_else(|_| {
            Err(ColonyError::Pipeline(format!(
                "worker for job {} panicked",
                self.job_id
            )))
        })
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Submission and query layer over the job registry.
///
/// Each job runs on its own worker thread and writes its artifacts under
/// `<output_root>/<job_id>`.
pub struct JobService {
    registry: Arc<JobRegistry>,
    predictor: Arc<dyn Predictor>,
    output_root: PathBuf,
}

impl JobService {
    pub fn new(registry: Arc<JobRegistry>, predictor: Arc<dyn Predictor>, output_root: &Path) -> Self {
        Self {
            registry,
            predictor,
            output_root: output_root.to_path_buf(),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.output_root.join(job_id)
    }

    /// Validate the request, register the job and start its worker.
    ///
    /// Input problems are returned here, before any job state exists.
    pub fn submit(&self, request: JobRequest) -> Result<JobHandle> {
        let JobRequest {
            job_id,
            sequence,
            config,
        } = request;
        validate_request(&sequence, &config)?;

        let metadata = JobMetadata {
            source_kind: sequence.source.kind,
            filename: sequence.source_name(),
        };
        self.registry.create(&job_id, metadata)?;
        let cancel = self
            .registry
            .cancellation(&job_id)
            .ok_or_else(|| ColonyError::JobNotFound(job_id.clone()))?;

        let registry = Arc::clone(&self.registry);
        let predictor = Arc::clone(&self.predictor);
        let job_dir = self.job_dir(&job_id);
        let worker_id = job_id.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("colony-job-{job_id}"))
            .spawn(move || {
                let outcome = run_worker(
                    &worker_id,
                    &registry,
                    predictor.as_ref(),
                    cancel.clone(),
                    &job_dir,
                    &sequence,
                    &config,
                );
                // A deleted job may have raced its worker to the artifact directory.
                if cancel.is_cancelled() {
                    remove_job_dir(&worker_id, &job_dir);
                }
                outcome
            });

        match spawned {
            Ok(thread) => {
                info!(job_id = %job_id, "Job submitted");
                Ok(JobHandle { job_id, thread })
            }
            Err(e) => {
                self.registry.delete(&job_id);
                Err(ColonyError::Io(e))
            }
        }
    }

    pub fn status(&self, job_id: &str) -> Result<JobStatusView> {
        self.registry
            .status(job_id)
            .ok_or_else(|| ColonyError::JobNotFound(job_id.to_string()))
    }

    pub fn job(&self, job_id: &str) -> Result<Job> {
        self.registry
            .get(job_id)
            .ok_or_else(|| ColonyError::JobNotFound(job_id.to_string()))
    }

    /// Result payload of a completed job.
    pub fn results(&self, job_id: &str) -> Result<AnalysisResult> {
        let job = self.job(job_id)?;
        match job.status {
            JobStatus::Completed => job.result.ok_or_else(|| {
                ColonyError::Pipeline(format!("job {job_id} completed without a result"))
            }),
            JobStatus::Failed => Err(ColonyError::JobFailed {
                job_id: job_id.to_string(),
                error: job.error.unwrap_or_default(),
            }),
            status => Err(ColonyError::JobNotReady {
                job_id: job_id.to_string(),
                status,
            }),
        }
    }

    /// Forget a job, stop its worker and remove its artifacts.
    ///
    /// A worker still in flight may be writing into the job directory; it
    /// removes the directory itself once it observes the cancellation.
    pub fn delete(&self, job_id: &str) -> Result<()> {
        let in_flight = self
            .registry
            .get(job_id)
            .is_some_and(|job| !job.status.is_terminal());
        if !self.registry.delete(job_id) {
            return Err(ColonyError::JobNotFound(job_id.to_string()));
        }
        let dir = self.job_dir(job_id);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) if in_flight => {
                debug!(job_id, error = %e, "Job directory busy, worker will remove it");
            }
            Err(e) => {
                warn!(job_id, error = %e, "Could not remove job artifacts");
                return Err(ColonyError::Storage(format!(
                    "removing {}: {e}",
                    dir.display()
                )));
            }
        }
        info!(job_id, "Job deleted");
        Ok(())
    }

    pub fn list(&self) -> Vec<Job> {
        self.registry.list()
    }
}

/// Body of a job's worker thread.
///
/// The cancellation flag is checked before anything touches the job
/// directory.
fn run_worker(
    job_id: &str,
    registry: &JobRegistry,
    predictor: &dyn Predictor,
    cancel: CancellationToken,
    job_dir: &Path,
    sequence: &FrameSequence,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    if let Err(e) = cancel.check(job_id) {
        registry.mark_failed(job_id, e.to_string());
        return Err(e);
    }
    let mut renderer = match DirectoryRenderer::new(job_dir) {
        Ok(r) => r,
        Err(e) => {
            registry.mark_failed(job_id, e.to_string());
            return Err(e);
        }
    };
    let ctx = JobContext {
        job_id,
        registry,
        predictor,
        cancel,
    };
    run_job(
        &ctx,
        &sequence.frames,
        sequence.ground_truth.as_deref(),
        config,
        &mut renderer,
    )
}

/// Best-effort removal of a cancelled job's artifacts.
fn remove_job_dir(job_id: &str, dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => debug!(job_id, "Removed artifacts of cancelled job"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(job_id, error = %e, "Could not remove artifacts of cancelled job"),
    }
}

fn validate_request(sequence: &FrameSequence, config: &AnalysisConfig) -> Result<()> {
    config.validate()?;
    let Some(first) = sequence.frames.first() else {
        return Err(ColonyError::EmptySequence);
    };
    if sequence.frames.len() < config.window_size {
        return Err(ColonyError::TooFewFrames {
            required: config.window_size,
            actual: sequence.frames.len(),
        });
    }
    let dim = first.dim();
    for frame in &sequence.frames {
        if frame.dim() != dim {
            return Err(ColonyError::ShapeMismatch {
                expected: dim,
                actual: frame.dim(),
                context: format!("frame {}", frame.metadata.frame_index),
            });
        }
    }
    if let Some(gt) = &sequence.ground_truth {
        for (i, mask) in gt.iter().enumerate() {
            if mask.dim() != dim {
                return Err(ColonyError::ShapeMismatch {
                    expected: dim,
                    actual: mask.dim(),
                    context: format!("ground-truth mask {i}"),
                });
            }
        }
    }
    Ok(())
}
