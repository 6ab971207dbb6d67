mod common;

use ndarray::Array2;

use colony_core::analysis::{analyze_frame, Phenotype, PhenotypeRules};

#[test]
fn test_disk_is_compact() {
    let disk = common::disk_mask(40, 40, 20.0, 20.0, 10.0);
    let analysis = analyze_frame(&disk, &PhenotypeRules::default());
    assert_eq!(analysis.biomass, disk.iter().filter(|&&v| v).count());
    assert_eq!(analysis.components.len(), 1);

    let c = &analysis.components[0];
    assert_eq!(c.phenotype, Phenotype::Compact);
    assert!(c.aspect_ratio < 1.1, "aspect {}", c.aspect_ratio);
    assert!(c.solidity > 0.9, "solidity {}", c.solidity);
    approx::assert_abs_diff_eq!(c.centroid.0, 20.0, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(c.centroid.1, 20.0, epsilon = 1e-9);
    assert_eq!(analysis.phenotype_counts.compact, 1);
}

#[test]
fn test_thin_line_is_elongated() {
    let line = common::rect_mask(20, 20, 5, 3, 1, 10);
    let analysis = analyze_frame(&line, &PhenotypeRules::default());
    assert_eq!(analysis.biomass, 10);
    let c = &analysis.components[0];
    assert_eq!(c.phenotype, Phenotype::Elongated);
    assert_eq!((c.bbox.height(), c.bbox.width()), (1, 10));
    assert!(c.aspect_ratio >= 3.0);
}

#[test]
fn test_large_rod() {
    // 10 x 25: axis ratio ~2.5 and area 250.
    let rod = common::rect_mask(40, 40, 5, 5, 10, 25);
    let analysis = analyze_frame(&rod, &PhenotypeRules::default());
    let c = &analysis.components[0];
    assert!(c.aspect_ratio >= 2.0 && c.aspect_ratio < 3.0, "aspect {}", c.aspect_ratio);
    assert_eq!(c.phenotype, Phenotype::RodLike);
}

#[test]
fn test_small_rod_is_other() {
    // 6 x 15: same shape class but only 90 pixels.
    let rod = common::rect_mask(30, 30, 5, 5, 6, 15);
    let analysis = analyze_frame(&rod, &PhenotypeRules::default());
    assert_eq!(analysis.components[0].phenotype, Phenotype::Other);
    assert_eq!(analysis.phenotype_counts.other, 1);
}

#[test]
fn test_labels_follow_raster_order() {
    let mut mask = common::rect_mask(30, 30, 20, 2, 3, 3);
    let top = common::rect_mask(30, 30, 1, 20, 3, 3);
    mask.zip_mut_with(&top, |a, &b| *a |= b);
    let analysis = analyze_frame(&mask, &PhenotypeRules::default());
    assert_eq!(analysis.components.len(), 2);
    assert_eq!(analysis.components[0].label, 1);
    assert_eq!(analysis.components[0].bbox.min_row, 1);
    assert_eq!(analysis.components[1].label, 2);
    assert_eq!(analysis.components[1].bbox.min_row, 20);
    assert_eq!(analysis.phenotype_counts.total(), 2);
}

#[test]
fn test_empty_mask() {
    let analysis = analyze_frame(&Array2::from_elem((10, 10), false), &PhenotypeRules::default());
    assert_eq!(analysis.biomass, 0);
    assert!(analysis.components.is_empty());
    assert_eq!(analysis.phenotype_counts.total(), 0);
}

#[test]
fn test_rule_chain_order() {
    let rules = PhenotypeRules::default();
    assert_eq!(rules.classify(3.0, 10, 1.0), Phenotype::Elongated);
    assert_eq!(rules.classify(2.5, 201, 1.0), Phenotype::RodLike);
    assert_eq!(rules.classify(2.5, 200, 1.0), Phenotype::Other);
    assert_eq!(rules.classify(2.0, 500, 1.0), Phenotype::RodLike);
    assert_eq!(rules.classify(1.5, 100, 0.8), Phenotype::Compact);
    assert_eq!(rules.classify(1.5, 100, 0.79), Phenotype::Other);
    assert_eq!(rules.classify(1.9, 100, 1.0), Phenotype::Other);
}

#[test]
fn test_l_shape_has_low_solidity() {
    let mut mask = common::rect_mask(30, 30, 2, 2, 20, 3);
    let foot = common::rect_mask(30, 30, 19, 2, 3, 20);
    mask.zip_mut_with(&foot, |a, &b| *a |= b);
    let analysis = analyze_frame(&mask, &PhenotypeRules::default());
    assert_eq!(analysis.components.len(), 1);
    assert!(analysis.components[0].solidity < 0.8);
}
