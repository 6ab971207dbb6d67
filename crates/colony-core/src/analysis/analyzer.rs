use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mask::{count_foreground, label_components, BinaryMask};

use super::phenotype::{Phenotype, PhenotypeCounts, PhenotypeRules};
use super::region::{measure_regions, BoundingBox};

/// A classified connected region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub label: u32,
    pub area: usize,
    /// (row, col)
    pub centroid: (f64, f64),
    pub bbox: BoundingBox,
    pub major_axis_length: f64,
    pub minor_axis_length: f64,
    pub aspect_ratio: f64,
    pub solidity: f64,
    pub phenotype: Phenotype,
}

/// Per-frame measurements of a cleaned mask.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Foreground pixel count.
    pub biomass: usize,
    pub phenotype_counts: PhenotypeCounts,
    /// Sorted by label; labels follow raster order starting at 1.
    pub components: Vec<Component>,
}

impl FrameAnalysis {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Measure biomass and classify every 8-connected region of `mask`.
pub fn analyze_frame(mask: &BinaryMask, rules: &PhenotypeRules) -> FrameAnalysis {
    let biomass = count_foreground(mask);
    let labeled = label_components(mask);

    let mut phenotype_counts = PhenotypeCounts::default();
    let components: Vec<Component> = measure_regions(&labeled)
        .into_iter()
        .map(|region| {
            let phenotype = rules.classify_region(&region);
            phenotype_counts.add(phenotype);
            Component {
                label: region.label,
                area: region.area,
                centroid: region.centroid,
                bbox: region.bbox,
                major_axis_length: region.major_axis_length,
                minor_axis_length: region.minor_axis_length,
                aspect_ratio: region.aspect_ratio(),
                solidity: region.solidity,
                phenotype,
            }
        })
        .collect();

    debug!(biomass, components = components.len(), "Analyzed frame");
    FrameAnalysis {
        biomass,
        phenotype_counts,
        components,
    }
}
