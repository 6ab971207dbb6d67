mod common;

use ndarray::Array2;

use colony_core::mask::{
    clean_mask, count_foreground, ellipse_kernel, erode, label_components, remove_small_components,
    threshold_mask, CleanParams,
};

fn params(min_area: usize, erosion_kernel: usize) -> CleanParams {
    CleanParams {
        threshold: 0.5,
        min_area,
        erosion_kernel,
    }
}

#[test]
fn test_threshold_is_strict() {
    let prob = Array2::from_shape_vec((1, 3), vec![0.49, 0.5, 0.51]).unwrap();
    let mask = threshold_mask(&prob, 0.5);
    assert_eq!(mask.as_slice().unwrap(), &[false, false, true]);
}

#[test]
fn test_blob_below_min_area_is_removed() {
    let blob = common::rect_mask(40, 40, 10, 10, 20, 20);
    let prob = common::mask_to_prob(&blob, 0.9, 0.1);
    let cleaned = clean_mask(&prob, &params(401, 0));
    assert_eq!(count_foreground(&cleaned), 0);
}

#[test]
fn test_blob_at_min_area_is_kept() {
    let blob = common::rect_mask(40, 40, 10, 10, 20, 20);
    let prob = common::mask_to_prob(&blob, 0.9, 0.1);
    let cleaned = clean_mask(&prob, &params(400, 0));
    assert_eq!(cleaned, blob);
}

#[test]
fn test_filtering_happens_before_erosion() {
    // 20x20 = 400 pixels survives min_area = 400 even though erosion then shrinks it.
    let blob = common::rect_mask(40, 40, 10, 10, 20, 20);
    let prob = common::mask_to_prob(&blob, 0.9, 0.1);
    let cleaned = clean_mask(&prob, &params(400, 3));
    let kept = count_foreground(&cleaned);
    assert!(kept > 0 && kept < 400, "kept {kept}");
}

#[test]
fn test_small_components_dropped_large_kept() {
    let mut mask = common::rect_mask(30, 30, 2, 2, 10, 10);
    mask[[25, 25]] = true;
    mask[[25, 26]] = true;
    let filtered = remove_small_components(&mask, 5);
    assert_eq!(count_foreground(&filtered), 100);
    assert!(!filtered[[25, 25]]);
}

#[test]
fn test_diagonal_pixels_are_one_component() {
    let mut mask = Array2::from_elem((4, 4), false);
    mask[[0, 0]] = true;
    mask[[1, 1]] = true;
    mask[[2, 2]] = true;
    mask[[0, 3]] = true;
    let labels = label_components(&mask);
    assert_eq!(labels.len(), 2);
    assert_eq!(labels.stats[0].area, 3);
    assert_eq!(labels.labels[[0, 0]], 1);
    assert_eq!(labels.labels[[0, 3]], 2);
}

#[test]
fn test_u_shape_merges_into_one_label() {
    // Two arms joined at the bottom get provisional labels that must merge.
    let mut mask = Array2::from_elem((5, 5), false);
    for r in 0..5 {
        mask[[r, 0]] = true;
        mask[[r, 4]] = true;
    }
    for c in 0..5 {
        mask[[4, c]] = true;
    }
    let labels = label_components(&mask);
    assert_eq!(labels.len(), 1);
    assert_eq!(labels.stats[0].area, 13);
    assert_eq!(labels.stats[0].bbox, (0, 4, 0, 4));
}

#[test]
fn test_ellipse_kernels() {
    let k3 = ellipse_kernel(3);
    let cross = [
        [false, true, false],
        [true, true, true],
        [false, true, false],
    ];
    for r in 0..3 {
        for c in 0..3 {
            assert_eq!(k3[[r, c]], cross[r][c]);
        }
    }
    let k5 = ellipse_kernel(5);
    assert_eq!(k5.iter().filter(|&&v| v).count(), 17);
    assert!(!k5[[0, 0]] && k5[[0, 2]] && k5[[1, 0]]);
}

#[test]
fn test_cross_erosion_of_square() {
    let square = common::rect_mask(9, 9, 2, 2, 5, 5);
    let eroded = erode(&square, &ellipse_kernel(3));
    assert_eq!(eroded, common::rect_mask(9, 9, 3, 3, 3, 3));
}

#[test]
fn test_erosion_keeps_image_border() {
    let full = Array2::from_elem((6, 6), true);
    let eroded = erode(&full, &ellipse_kernel(3));
    assert_eq!(eroded, full);
}

#[test]
fn test_zero_kernel_skips_erosion() {
    let blob = common::rect_mask(10, 10, 2, 2, 4, 4);
    let prob = common::mask_to_prob(&blob, 1.0, 0.0);
    assert_eq!(clean_mask(&prob, &params(0, 0)), blob);
}
