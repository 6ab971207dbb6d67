use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colony_core::division::EventPolicy;
use colony_core::io::load_sequence;
use colony_core::jobs::{JobRegistry, JobRequest, JobService};
use colony_core::pipeline::{AnalysisConfig, CenterIntensityPredictor};
use indicatif::{ProgressBar, ProgressStyle};

use crate::summary::{print_result_summary, print_run_summary};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Either,
    Both,
    GrowthOnly,
    TopologyOnly,
}

impl From<PolicyArg> for EventPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Either => EventPolicy::Either,
            PolicyArg::Both => EventPolicy::Both,
            PolicyArg::GrowthOnly => EventPolicy::GrowthOnly,
            PolicyArg::TopologyOnly => EventPolicy::TopologyOnly,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// SER video or image directory (optionally with raw_images/ and masks)
    pub input: PathBuf,

    /// Analysis config file (TOML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output root; artifacts go to <output>/<job id>
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    /// Job id (random when omitted)
    #[arg(long)]
    pub job_id: Option<String>,

    /// Temporal window length (odd)
    #[arg(long)]
    pub window: Option<usize>,

    /// Foreground probability threshold
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Minimum component area in pixels
    #[arg(long)]
    pub min_area: Option<usize>,

    /// Erosion kernel size (0 disables)
    #[arg(long)]
    pub erosion: Option<usize>,

    /// Frames per second of the sequence
    #[arg(long)]
    pub fps: Option<f64>,

    /// How growth spikes and component jumps combine into events
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Treat dark pixels as foreground
    #[arg(long)]
    pub invert: bool,

    /// Worker threads for window analysis (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = build_config(args)?;
    let sequence = load_sequence(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let job_id = args
        .job_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    print_run_summary(&args.input, &args.output, &job_id, &sequence.source, &config);

    let service = JobService::new(
        Arc::new(JobRegistry::new()),
        Arc::new(CenterIntensityPredictor::new(args.invert)),
        &args.output,
    );
    let handle = service
        .submit(JobRequest {
            job_id: job_id.clone(),
            sequence,
            config,
        })
        .context("Job rejected")?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:32} [{bar:40}] {pos}%")?
            .progress_chars("=> "),
    );
    while !handle.is_finished() {
        if let Ok(status) = service.status(&job_id) {
            pb.set_message(status.message);
            pb.set_position(status.progress as u64);
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let outcome = handle.join();
    let status = service.status(&job_id)?;
    pb.set_position(status.progress as u64);
    match outcome {
        Ok(result) => {
            pb.finish_with_message("Done");
            print_result_summary(&result, &service.job_dir(&job_id));
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            Err(e).with_context(|| format!("Job {job_id} failed"))
        }
    }
}

fn build_config(args: &RunArgs) -> Result<AnalysisConfig> {
    let mut config = match args.config {
        Some(ref path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(window) = args.window {
        config.window_size = window;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(min_area) = args.min_area {
        config.min_area = min_area;
    }
    if let Some(erosion) = args.erosion {
        config.erosion_kernel = erosion;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(policy) = args.policy {
        config.division.policy = policy.into();
    }
    config.validate().context("Invalid analysis config")?;
    Ok(config)
}
