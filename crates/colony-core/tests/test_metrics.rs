use std::path::PathBuf;

use colony_core::analysis::PhenotypeCounts;
use colony_core::pipeline::{AnalysisResult, MetricsRow, MetricsSeries};
use colony_core::render::FrameArtifactRefs;

fn series_with_collapse() -> MetricsSeries {
    MetricsSeries {
        time: vec![0.0, 0.1, 0.2],
        area_pred: vec![40, 0, 0],
        area_gt: None,
        growth_pred: vec![0.0, f64::NEG_INFINITY, 0.0],
        division_like: vec![0, 0, 0],
        component_count: vec![1, 0, 0],
        phenotype_counts: vec![PhenotypeCounts::default(); 3],
    }
}

#[test]
fn test_negative_infinite_growth_survives_json() {
    let series = series_with_collapse();
    let json = serde_json::to_string(&series).unwrap();
    assert!(json.contains(r#""-inf""#));
    assert!(!json.contains("null"));

    let back: MetricsSeries = serde_json::from_str(&json).unwrap();
    assert_eq!(back, series);
    assert_eq!(back.growth_pred[1], f64::NEG_INFINITY);
}

#[test]
fn test_nan_and_inf_growth_read_back() {
    let back: MetricsSeries = serde_json::from_str(
        r#"{"time":[0,1,2],"area_pred":[1,2,3],"area_gt":null,
            "growth_pred":["nan","inf",0.5],"division_like":[0,0,0],
            "component_count":[1,1,1],"phenotype_counts":[]}"#,
    )
    .unwrap();
    assert!(back.growth_pred[0].is_nan());
    assert_eq!(back.growth_pred[1], f64::INFINITY);
    assert_eq!(back.growth_pred[2], 0.5);
}

#[test]
fn test_garbage_growth_rejected() {
    let err = serde_json::from_str::<MetricsSeries>(
        r#"{"time":[0],"area_pred":[1],"area_gt":null,"growth_pred":["fast"],
            "division_like":[0],"component_count":[1],"phenotype_counts":[]}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("fast"));
}

#[test]
fn test_analysis_result_reads_back_from_summary() {
    let result = AnalysisResult {
        job_id: "collapse".into(),
        n_frames: 3,
        fps: 10.0,
        frames: vec![FrameArtifactRefs {
            index: 0,
            pred: Some(PathBuf::from("frames/pred_0000.png")),
            ..FrameArtifactRefs::default()
        }],
        video: Some(PathBuf::from("overlay.ser")),
        metrics_csv: None,
        metrics: series_with_collapse(),
        division_events: vec![],
    };
    let json = serde_json::to_string_pretty(&result).unwrap();
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_metrics_row_growth_as_text() {
    let row = MetricsRow {
        frame: 1,
        time: 0.1,
        area_pred: 0,
        growth_pred: f64::NEG_INFINITY,
        component_count: 0,
        rod_like: 0,
        elongated: 0,
        compact: 0,
        other: 0,
        division_like: 0,
        area_gt: Some(12),
    };
    let value = serde_json::to_value(&row).unwrap();
    assert_eq!(value["growth_pred"], "-inf");
    let back: MetricsRow = serde_json::from_value(value).unwrap();
    assert_eq!(back, row);
}
