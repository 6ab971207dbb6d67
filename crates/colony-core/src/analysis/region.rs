use serde::{Deserialize, Serialize};

use crate::consts::ASPECT_EPSILON;
use crate::mask::ComponentLabels;

use super::hull::solidity;

/// Inclusive pixel bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }
}

/// Shape measurements of one connected region, before classification.
#[derive(Clone, Debug)]
pub struct RegionProps {
    pub label: u32,
    pub area: usize,
    /// (row, col) mean pixel position.
    pub centroid: (f64, f64),
    pub bbox: BoundingBox,
    pub major_axis_length: f64,
    pub minor_axis_length: f64,
    pub solidity: f64,
}

impl RegionProps {
    /// Major over minor axis length. Degenerate ellipses (single-pixel-wide
    /// lines) fall back to the bounding box's long side over its short side.
    pub fn aspect_ratio(&self) -> f64 {
        if self.minor_axis_length > 0.0 {
            self.major_axis_length / self.minor_axis_length
        } else {
            let h = self.bbox.height() as f64;
            let w = self.bbox.width() as f64;
            h.max(w) / (h.min(w) + ASPECT_EPSILON)
        }
    }
}

#[derive(Default)]
struct MomentSums {
    sum_r: f64,
    sum_c: f64,
    sum_rr: f64,
    sum_cc: f64,
    sum_rc: f64,
    /// Per-row (min_col, max_col), indexed from the bbox top row.
    extents: Vec<Option<(usize, usize)>>,
}

/// Measure every labeled region in one pass over the label image.
pub fn measure_regions(components: &ComponentLabels) -> Vec<RegionProps> {
    let mut sums: Vec<MomentSums> = components
        .stats
        .iter()
        .map(|s| MomentSums {
            extents: vec![None; s.bbox.1 - s.bbox.0 + 1],
            ..Default::default()
        })
        .collect();

    for ((row, col), &label) in components.labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let idx = label as usize - 1;
        let top = components.stats[idx].bbox.0;
        let acc = &mut sums[idx];
        let (r, c) = (row as f64, col as f64);
        acc.sum_r += r;
        acc.sum_c += c;
        acc.sum_rr += r * r;
        acc.sum_cc += c * c;
        acc.sum_rc += r * c;
        let slot = &mut acc.extents[row - top];
        *slot = Some(match *slot {
            None => (col, col),
            Some((lo, hi)) => (lo.min(col), hi.max(col)),
        });
    }

    components
        .stats
        .iter()
        .zip(sums)
        .map(|(stat, acc)| {
            let n = stat.area as f64;
            let mean_r = acc.sum_r / n;
            let mean_c = acc.sum_c / n;
            // Normalized central second moments.
            let var_r = acc.sum_rr / n - mean_r * mean_r;
            let var_c = acc.sum_cc / n - mean_c * mean_c;
            let cov = acc.sum_rc / n - mean_r * mean_c;

            let half_trace = (var_r + var_c) / 2.0;
            let spread = (((var_r - var_c) / 2.0).powi(2) + cov * cov).sqrt();
            let l1 = (half_trace + spread).max(0.0);
            let l2 = (half_trace - spread).max(0.0);

            let rows: Vec<(usize, usize, usize)> = acc
                .extents
                .iter()
                .enumerate()
                .filter_map(|(i, e)| e.map(|(lo, hi)| (stat.bbox.0 + i, lo, hi)))
                .collect();

            RegionProps {
                label: stat.label,
                area: stat.area,
                centroid: (mean_r, mean_c),
                bbox: BoundingBox {
                    min_row: stat.bbox.0,
                    max_row: stat.bbox.1,
                    min_col: stat.bbox.2,
                    max_col: stat.bbox.3,
                },
                major_axis_length: 4.0 * l1.sqrt(),
                minor_axis_length: 4.0 * l2.sqrt(),
                solidity: solidity(stat.area, &rows),
            }
        })
        .collect()
}
