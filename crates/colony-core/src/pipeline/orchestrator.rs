use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::consts::RENDER_PROGRESS_DIVISIONS;
use crate::error::{ColonyError, Result};
use crate::frame::{ensure_unit_range, Frame};
use crate::jobs::{CancellationToken, JobRegistry, JobStatus, JobUpdate};
use crate::mask::BinaryMask;
use crate::render::{FrameArtifacts, Renderer};

use super::analyze::analyze_sequence;
use super::config::AnalysisConfig;
use super::metrics::{metrics_rows, AnalysisResult, MetricsSeries};
use super::predictor::Predictor;
use super::types::{PipelineStage, ProgressReporter};

/// Progress reporter that publishes stage checkpoints into the job registry.
pub struct RegistryReporter<'a> {
    registry: &'a JobRegistry,
    job_id: &'a str,
    stage: Mutex<Option<PipelineStage>>,
    current_total: AtomicUsize,
}

impl<'a> RegistryReporter<'a> {
    pub fn new(registry: &'a JobRegistry, job_id: &'a str) -> Self {
        Self {
            registry,
            job_id,
            stage: Mutex::new(None),
            current_total: AtomicUsize::new(0),
        }
    }

    fn current_stage(&self) -> Option<PipelineStage> {
        *self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressReporter for RegistryReporter<'_> {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        *self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(stage);
        self.current_total.store(total_items.unwrap_or(0), Ordering::Relaxed);
        let (start, _) = stage.progress_range();
        self.registry.update(
            self.job_id,
            JobUpdate::new()
                .status(JobStatus::Running)
                .stage(stage.job_stage())
                .progress(start)
                .message(stage.to_string()),
        );
    }

    fn advance(&self, items_done: usize) {
        let total = self.current_total.load(Ordering::Relaxed);
        let Some(stage) = self.current_stage() else {
            return;
        };
        if total == 0 {
            return;
        }
        let (start, end) = stage.progress_range();
        let fraction = items_done.min(total) as f64 / total as f64;
        self.registry.update(
            self.job_id,
            JobUpdate::new()
                .progress(start + fraction * (end - start))
                .message(stage.item_message(items_done, total)),
        );
    }
}

/// Shared handles a job worker needs.
pub struct JobContext<'a> {
    pub job_id: &'a str,
    pub registry: &'a JobRegistry,
    pub predictor: &'a dyn Predictor,
    pub cancel: CancellationToken,
}

/// Run one job to completion, recording the outcome in the registry.
///
/// Any error from any stage is recorded once via `mark_failed` and returned;
/// nothing is retried.
pub fn run_job(
    ctx: &JobContext<'_>,
    frames: &[Frame],
    ground_truth: Option<&[BinaryMask]>,
    config: &AnalysisConfig,
    renderer: &mut dyn Renderer,
) -> Result<AnalysisResult> {
    let started = Instant::now();
    match execute(ctx, frames, ground_truth, config, renderer) {
        Ok(result) => {
            info!(
                job_id = ctx.job_id,
                frames = result.n_frames,
                events = result.division_events.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Job completed"
            );
            ctx.registry.mark_completed(ctx.job_id, result.clone());
            Ok(result)
        }
        Err(e) => {
            warn!(job_id = ctx.job_id, error = %e, "Job failed");
            ctx.registry.mark_failed(ctx.job_id, e.to_string());
            Err(e)
        }
    }
}

fn execute(
    ctx: &JobContext<'_>,
    frames: &[Frame],
    ground_truth: Option<&[BinaryMask]>,
    config: &AnalysisConfig,
    renderer: &mut dyn Renderer,
) -> Result<AnalysisResult> {
    let job_id = ctx.job_id;
    let reporter = RegistryReporter::new(ctx.registry, job_id);

    reporter.begin_stage(PipelineStage::Preprocessing, Some(frames.len()));
    config.validate()?;
    if frames.is_empty() {
        return Err(ColonyError::EmptySequence);
    }
    let normalized: Vec<Frame> = frames
        .par_iter()
        .map(|f| Frame {
            data: ensure_unit_range(&f.data),
            metadata: f.metadata.clone(),
        })
        .collect();
    reporter.finish_stage();

    let series = analyze_sequence(
        &normalized,
        ground_truth,
        config,
        ctx.predictor,
        &reporter,
        &ctx.cancel,
        job_id,
    )?;

    let total = series.len();
    let cadence = (total / RENDER_PROGRESS_DIVISIONS).max(1);
    reporter.begin_stage(PipelineStage::VideoGeneration, Some(total));
    let mut frame_refs = Vec::with_capacity(total);
    for (idx, record) in series.records.iter().enumerate() {
        ctx.cancel.check(job_id)?;
        let center = record.center_index;
        let artifacts = FrameArtifacts {
            record,
            frame: &normalized[center],
            pred_mask: &series.masks[idx],
            gt_mask: ground_truth.and_then(|gt| gt.get(center)),
            fps: config.fps,
        };
        frame_refs.push(renderer.render_frame(&artifacts)?);
        if (idx + 1) % cadence == 0 {
            reporter.advance(idx + 1);
        }
    }

    ctx.cancel.check(job_id)?;
    ctx.registry.update(
        job_id,
        JobUpdate::new()
            .progress(PipelineStage::VideoGeneration.progress_range().1)
            .message("Creating output video"),
    );
    let video = renderer.finish_video()?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::SavingResults, None);
    let rows = metrics_rows(&series.records, config.fps);
    let metrics_csv = renderer.write_metrics(&rows)?;

    let result = AnalysisResult {
        job_id: job_id.to_string(),
        n_frames: total,
        fps: config.fps,
        frames: frame_refs,
        video,
        metrics_csv,
        metrics: MetricsSeries::from_rows(&rows),
        division_events: series.division_events.iter().copied().collect(),
    };
    renderer.write_summary(&result)?;
    reporter.finish_stage();
    Ok(result)
}
