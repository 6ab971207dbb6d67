use std::path::Path;

use colony_core::frame::SourceInfo;
use colony_core::pipeline::{AnalysisConfig, AnalysisResult};
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(
    input: &Path,
    output: &Path,
    job_id: &str,
    source: &SourceInfo,
    config: &AnalysisConfig,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Colony Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    println!("  {:<14}{}", s.label.apply_to("Output"), s.path.apply_to(output.display()));
    println!("  {:<14}{}", s.label.apply_to("Job"), s.value.apply_to(job_id));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.value.apply_to(format!(
            "{} frames, {}x{} ({})",
            source.total_frames, source.width, source.height, source.kind
        ))
    );
    if source.ground_truth_frames > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Ground truth"),
            s.value.apply_to(format!("{} masks", source.ground_truth_frames))
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Ground truth"),
            s.disabled.apply_to("none")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Segmentation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(format!("{} frames", config.window_size))
    );
    println!("    {:<12}{}", s.label.apply_to("Threshold"), s.value.apply_to(config.threshold));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min area"),
        s.value.apply_to(format!("{} px", config.min_area))
    );
    if config.erosion_kernel > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Erosion"),
            s.value.apply_to(format!("{0}x{0}", config.erosion_kernel))
        );
    } else {
        println!("    {:<12}{}", s.label.apply_to("Erosion"), s.disabled.apply_to("disabled"));
    }
    println!();

    println!("  {}", s.header.apply_to("Division Detection"));
    println!("    {:<12}{}", s.label.apply_to("Policy"), s.method.apply_to(config.division.policy));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Spike"),
        s.value.apply_to(format!("mean + {} std", config.division.growth_spike_std))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Components"),
        s.value.apply_to(format!("+{}", config.division.component_increase_threshold))
    );
    println!();
}

pub fn print_result_summary(result: &AnalysisResult, job_dir: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    println!("    {:<12}{}", s.label.apply_to("Frames"), s.value.apply_to(result.n_frames));
    let peak = result.metrics.area_pred.iter().copied().max().unwrap_or(0);
    println!(
        "    {:<12}{}",
        s.label.apply_to("Peak area"),
        s.value.apply_to(format!("{peak} px"))
    );
    if result.division_events.is_empty() {
        println!("    {:<12}{}", s.label.apply_to("Divisions"), s.disabled.apply_to("none"));
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Divisions"),
            s.value.apply_to(format!("{:?}", result.division_events))
        );
    }
    if let Some(ref video) = result.video {
        println!("    {:<12}{}", s.label.apply_to("Video"), s.path.apply_to(video.display()));
    }
    if let Some(ref csv) = result.metrics_csv {
        println!("    {:<12}{}", s.label.apply_to("Metrics"), s.path.apply_to(csv.display()));
    }
    println!("    {:<12}{}", s.label.apply_to("Artifacts"), s.path.apply_to(job_dir.display()));
    println!();
}
