use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::analysis::{analyze_frame, FrameAnalysis};
use crate::division::{detect_division_events, growth_series};
use crate::error::{ColonyError, Result};
use crate::flow::build_feature_tensor;
use crate::frame::Frame;
use crate::jobs::CancellationToken;
use crate::mask::{clean_mask, count_foreground, BinaryMask};
use crate::temporal::{temporal_windows, TemporalWindow};

use super::config::AnalysisConfig;
use super::predictor::Predictor;
use super::types::{FrameRecord, PipelineStage, ProgressReporter, SeriesAnalysis};

/// Features, prediction, cleaning and analysis for one window.
pub fn analyze_window(
    window: &TemporalWindow<'_>,
    config: &AnalysisConfig,
    predictor: &dyn Predictor,
) -> Result<(BinaryMask, FrameAnalysis)> {
    let features = build_feature_tensor(window, &config.flow)?;
    let prob = predictor.predict(&features)?;
    let expected = window.center().dim();
    if prob.dim() != expected {
        return Err(ColonyError::MaskShape {
            expected,
            actual: prob.dim(),
        });
    }
    let mask = clean_mask(&prob, &config.clean_params());
    let analysis = analyze_frame(&mask, &config.phenotype);
    Ok((mask, analysis))
}

/// Analyze every temporal window of `frames`, then scan the accumulated
/// series for division-like events.
///
/// Windows are processed in chunks of [`AnalysisConfig::chunk_size`]; progress
/// is reported and `cancel` checked between chunks. Results keep window order.
pub fn analyze_sequence(
    frames: &[Frame],
    ground_truth: Option<&[BinaryMask]>,
    config: &AnalysisConfig,
    predictor: &dyn Predictor,
    reporter: &dyn ProgressReporter,
    cancel: &CancellationToken,
    job_id: &str,
) -> Result<SeriesAnalysis> {
    let windows: Vec<TemporalWindow<'_>> = temporal_windows(frames, config.window_size).collect();
    let total = windows.len();
    let chunk_size = config.chunk_size(total);
    info!(
        job_id,
        frames = frames.len(),
        windows = total,
        predictor = predictor.name(),
        "Analyzing sequence"
    );

    reporter.begin_stage(PipelineStage::Inference, Some(total));
    let mut outputs: Vec<(BinaryMask, FrameAnalysis)> = Vec::with_capacity(total);
    for chunk in windows.chunks(chunk_size) {
        cancel.check(job_id)?;
        let results: Vec<(BinaryMask, FrameAnalysis)> = if config.parallel {
            chunk
                .par_iter()
                .map(|w| analyze_window(w, config, predictor))
                .collect::<Result<_>>()?
        } else {
            chunk
                .iter()
                .map(|w| analyze_window(w, config, predictor))
                .collect::<Result<_>>()?
        };
        outputs.extend(results);
        reporter.advance(outputs.len());
        debug!(job_id, done = outputs.len(), total, "Window chunk analyzed");
    }
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Postprocessing, None);
    let biomass: Vec<usize> = outputs.iter().map(|(_, a)| a.biomass).collect();
    let counts: Vec<usize> = outputs.iter().map(|(_, a)| a.component_count()).collect();
    let division_events: BTreeSet<usize> =
        detect_division_events(&biomass, &counts, &config.division);
    let growth = growth_series(&biomass);

    let mut records = Vec::with_capacity(total);
    let mut masks = Vec::with_capacity(total);
    for (frame, ((mask, analysis), window)) in outputs.into_iter().zip(&windows).enumerate() {
        let center_index = window.center_index;
        let area_gt = ground_truth
            .map(|gt| gt.get(center_index).map(count_foreground).unwrap_or(0));
        records.push(FrameRecord {
            frame,
            center_index,
            biomass: analysis.biomass,
            components: analysis.components,
            phenotype_counts: analysis.phenotype_counts,
            growth_rate: growth[frame],
            division_like: division_events.contains(&frame),
            area_gt,
        });
        masks.push(mask);
    }
    reporter.finish_stage();

    info!(
        job_id,
        analyzed = records.len(),
        events = division_events.len(),
        "Sequence analysis complete"
    );
    Ok(SeriesAnalysis {
        records,
        masks,
        division_events,
    })
}
