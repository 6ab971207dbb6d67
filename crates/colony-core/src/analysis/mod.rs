pub mod analyzer;
pub mod hull;
pub mod phenotype;
pub mod region;

pub use analyzer::{analyze_frame, Component, FrameAnalysis};
pub use phenotype::{Phenotype, PhenotypeCounts, PhenotypeRules};
pub use region::{measure_regions, BoundingBox, RegionProps};
