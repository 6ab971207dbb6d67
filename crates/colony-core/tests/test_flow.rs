mod common;

use ndarray::Array2;

use colony_core::error::ColonyError;
use colony_core::flow::features::build_feature_tensor_from_frames;
use colony_core::flow::pyramid::{build_pyramid, usable_levels};
use colony_core::flow::{build_feature_tensor, estimate_flow, to_byte_domain, FeatureTensor, FlowParams};
use colony_core::frame::Frame;
use colony_core::temporal::temporal_windows;

#[test]
fn test_channel_count() {
    assert_eq!(FeatureTensor::channel_count(5), 13);
    assert_eq!(FeatureTensor::channel_count(3), 7);
    assert_eq!(FeatureTensor::channel_count(1), 1);
}

#[test]
fn test_identical_frames_have_zero_motion() {
    let frames = common::identical_frames(5, 40, 48);
    let window = temporal_windows(&frames, 5).next().unwrap();
    let tensor = build_feature_tensor(&window, &FlowParams::default()).unwrap();

    assert_eq!(tensor.channels(), 13);
    assert_eq!((tensor.height(), tensor.width()), (40, 48));
    for pair in 0..4 {
        let (dx, dy) = tensor.motion(pair);
        assert!(dx.iter().all(|&v| v == 0.0), "pair {pair} dx not zero");
        assert!(dy.iter().all(|&v| v == 0.0), "pair {pair} dy not zero");
    }
}

#[test]
fn test_raw_channels_keep_window_order() {
    let frames: Vec<Frame> = (0..5)
        .map(|i| Frame::with_index(Array2::from_elem((8, 8), i as f32 * 0.1), i))
        .collect();
    let tensor = build_feature_tensor_from_frames(&frames, &FlowParams::default()).unwrap();
    for i in 0..5 {
        approx::assert_abs_diff_eq!(tensor.intensity(i)[[3, 3]], i as f32 * 0.1, epsilon = 1e-6);
    }
    approx::assert_abs_diff_eq!(tensor.center_intensity()[[0, 0]], 0.2, epsilon = 1e-6);
}

#[test]
fn test_shape_mismatch_fails() {
    let frames = vec![
        Frame::with_index(Array2::zeros((8, 8)), 0),
        Frame::with_index(Array2::zeros((8, 9)), 1),
    ];
    let err = build_feature_tensor_from_frames(&frames, &FlowParams::default()).unwrap_err();
    assert!(matches!(err, ColonyError::ShapeMismatch { .. }));
}

#[test]
fn test_rightward_shift_gives_positive_dx() {
    let prev = common::gaussian_spot(64, 64, 32.0, 31.0, 5.0);
    let next = common::gaussian_spot(64, 64, 32.0, 32.0, 5.0);
    let flow = estimate_flow(
        &to_byte_domain(&prev),
        &to_byte_domain(&next),
        &FlowParams::default(),
    )
    .unwrap();

    let dx = flow.dx[[32, 31]];
    let dy = flow.dy[[32, 31]];
    assert!(dx > 0.3, "dx = {dx}");
    assert!(dx.abs() > dy.abs(), "dx = {dx}, dy = {dy}");
}

#[test]
fn test_downward_shift_gives_positive_dy() {
    let prev = common::gaussian_spot(64, 64, 31.0, 32.0, 5.0);
    let next = common::gaussian_spot(64, 64, 32.0, 32.0, 5.0);
    let flow = estimate_flow(
        &to_byte_domain(&prev),
        &to_byte_domain(&next),
        &FlowParams::default(),
    )
    .unwrap();

    let dy = flow.dy[[31, 32]];
    assert!(dy > 0.3, "dy = {dy}");
}

#[test]
fn test_byte_domain_rounds_and_clips() {
    let data = Array2::from_shape_vec((1, 4), vec![-0.1, 0.5, 0.999, 1.2]).unwrap();
    let bytes = to_byte_domain(&data);
    assert_eq!(bytes.as_slice().unwrap(), &[0.0, 128.0, 255.0, 255.0]);
}

#[test]
fn test_pyramid_truncates_small_frames() {
    assert_eq!(usable_levels(64, 64, 0.5, 3), 1);
    assert_eq!(usable_levels(256, 256, 0.5, 3), 3);
    assert_eq!(usable_levels(20, 200, 0.5, 3), 0);

    let data = Array2::<f32>::zeros((128, 96));
    let pyramid = build_pyramid(&data, 0.5, usable_levels(128, 96, 0.5, 3));
    let dims: Vec<_> = pyramid.iter().map(|l| l.dim()).collect();
    assert_eq!(dims, vec![(128, 96), (64, 48)]);
}

#[test]
fn test_flow_params_validation() {
    assert!(FlowParams::default().validate().is_ok());
    let bad = FlowParams {
        pyr_scale: 1.0,
        ..FlowParams::default()
    };
    assert!(matches!(bad.validate(), Err(ColonyError::InvalidConfig(_))));
    let bad = FlowParams {
        poly_sigma: 0.0,
        ..FlowParams::default()
    };
    assert!(bad.validate().is_err());
}
