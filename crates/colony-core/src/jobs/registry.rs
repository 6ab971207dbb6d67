use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{ColonyError, Result};
use crate::pipeline::AnalysisResult;

use super::types::{Job, JobMetadata, JobStage, JobStatus, JobStatusView, JobUpdate};

/// Shared flag a worker polls to learn that its job was withdrawn.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is raised.
    pub fn check(&self, job_id: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(ColonyError::Cancelled(job_id.to_string()))
        } else {
            Ok(())
        }
    }
}

struct JobEntry {
    job: Job,
    cancel: CancellationToken,
}

/// Thread-safe store of job state, shared between workers and pollers.
///
/// One mutex guards the whole map. Readers always receive copies.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, JobEntry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, JobEntry>> {
        // Every critical section leaves the map consistent, so a panic in
        // another holder does not invalidate it.
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new job in the Queued state.
    pub fn create(&self, job_id: &str, metadata: JobMetadata) -> Result<Job> {
        let mut jobs = self.lock();
        if jobs.contains_key(job_id) {
            return Err(ColonyError::JobExists(job_id.to_string()));
        }
        let job = Job::queued(job_id, metadata);
        jobs.insert(
            job_id.to_string(),
            JobEntry {
                job: job.clone(),
                cancel: CancellationToken::new(),
            },
        );
        debug!(job_id, "Job created");
        Ok(job)
    }

    /// Merge the provided fields into a job. Unknown ids are ignored.
    ///
    /// Backward status moves are dropped, and progress is clamped to
    /// [0, 100] and never decreases.
    pub fn update(&self, job_id: &str, update: JobUpdate) {
        let mut jobs = self.lock();
        let Some(entry) = jobs.get_mut(job_id) else {
            return;
        };
        let job = &mut entry.job;

        if let Some(status) = update.status {
            if job.status.can_transition_to(status) {
                job.status = status;
            } else {
                warn!(job_id, from = %job.status, to = %status, "Ignoring backward status transition");
            }
        }
        if let Some(progress) = update.progress {
            let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 100.0) };
            job.progress = job.progress.max(progress);
        }
        if let Some(stage) = update.stage {
            job.stage = stage;
        }
        if let Some(message) = update.message {
            job.message = message;
        }
        if let Some(error) = update.error {
            job.error = Some(error);
        }
        if let Some(result) = update.result {
            job.result = Some(result);
        }
        job.updated_at = Utc::now();
    }

    /// Snapshot of a job.
    pub fn get(&self, job_id: &str) -> Option<Job> {
        self.lock().get(job_id).map(|entry| entry.job.clone())
    }

    pub fn status(&self, job_id: &str) -> Option<JobStatusView> {
        self.lock().get(job_id).map(|entry| entry.job.status_view())
    }

    pub fn mark_failed(&self, job_id: &str, error: impl Into<String>) {
        self.update(
            job_id,
            JobUpdate::new()
                .status(JobStatus::Failed)
                .progress(100.0)
                .error(error),
        );
    }

    pub fn mark_completed(&self, job_id: &str, result: AnalysisResult) {
        self.update(
            job_id,
            JobUpdate::new()
                .status(JobStatus::Completed)
                .progress(100.0)
                .stage(JobStage::SavingResults)
                .message("Processing completed")
                .result(result),
        );
    }

    /// Remove a job and raise its cancellation flag. Returns whether it existed.
    pub fn delete(&self, job_id: &str) -> bool {
        match self.lock().remove(job_id) {
            Some(entry) => {
                entry.cancel.cancel();
                debug!(job_id, "Job deleted");
                true
            }
            None => false,
        }
    }

    /// The job's cancellation token, shared with its worker.
    pub fn cancellation(&self, job_id: &str) -> Option<CancellationToken> {
        self.lock().get(job_id).map(|entry| entry.cancel.clone())
    }

    /// Snapshots of every job, oldest first.
    pub fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.lock().values().map(|entry| entry.job.clone()).collect();
        jobs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        jobs
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
