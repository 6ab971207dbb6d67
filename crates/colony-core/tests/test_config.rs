use colony_core::division::EventPolicy;
use colony_core::error::ColonyError;
use colony_core::pipeline::AnalysisConfig;

#[test]
fn test_defaults_validate() {
    let config = AnalysisConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.window_size, 5);
    assert_eq!(config.threshold, 0.5);
    assert_eq!(config.min_area, 300);
    assert_eq!(config.erosion_kernel, 3);
    assert_eq!(config.division.policy, EventPolicy::Either);
}

#[test]
fn test_toml_round_trip() {
    let mut config = AnalysisConfig::default();
    config.window_size = 7;
    config.min_area = 50;
    config.progress_chunk = Some(4);
    config.division.policy = EventPolicy::TopologyOnly;
    config.flow.iterations = 5;

    let text = config.to_toml().unwrap();
    let parsed = AnalysisConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_toml_takes_defaults() {
    let text = r#"
window_size = 3
threshold = 0.7

[phenotype]
rod_min_area = 150

[division]
policy = "both"
"#;
    let config = AnalysisConfig::from_toml_str(text).unwrap();
    assert_eq!(config.window_size, 3);
    assert_eq!(config.threshold, 0.7);
    assert_eq!(config.min_area, 300);
    assert_eq!(config.phenotype.rod_min_area, 150);
    assert_eq!(config.phenotype.elongated_min_aspect, 3.0);
    assert_eq!(config.division.policy, EventPolicy::Both);
    assert_eq!(config.division.growth_spike_std, 2.0);
    assert_eq!(config.flow, Default::default());
}

#[test]
fn test_even_window_rejected() {
    let err = AnalysisConfig::from_toml_str("window_size = 4").unwrap_err();
    assert!(matches!(err, ColonyError::InvalidConfig(_)));
}

#[test]
fn test_threshold_out_of_range_rejected() {
    let config = AnalysisConfig {
        threshold: 1.5,
        ..AnalysisConfig::default()
    };
    assert!(matches!(config.validate(), Err(ColonyError::InvalidConfig(_))));
}

#[test]
fn test_zero_progress_chunk_rejected() {
    let config = AnalysisConfig {
        progress_chunk: Some(0),
        ..AnalysisConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_policy_is_parse_error() {
    let err = AnalysisConfig::from_toml_str("[division]\npolicy = \"sometimes\"").unwrap_err();
    assert!(matches!(err, ColonyError::ConfigParse(_)));
}

#[test]
fn test_chunk_size() {
    let config = AnalysisConfig::default();
    assert_eq!(config.chunk_size(0), 1);
    assert_eq!(config.chunk_size(10), 1);
    assert_eq!(config.chunk_size(100), 5);
    let fixed = AnalysisConfig {
        progress_chunk: Some(8),
        ..AnalysisConfig::default()
    };
    assert_eq!(fixed.chunk_size(100), 8);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.toml");
    std::fs::write(&path, "fps = 10.0\nparallel = false\n").unwrap();
    let config = AnalysisConfig::load(&path).unwrap();
    assert_eq!(config.fps, 10.0);
    assert!(!config.parallel);

    assert!(matches!(
        AnalysisConfig::load(&dir.path().join("missing.toml")),
        Err(ColonyError::Io(_))
    ));
}
