use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_COMPACT_MAX_ASPECT, DEFAULT_COMPACT_MIN_SOLIDITY, DEFAULT_ELONGATED_MIN_ASPECT,
    DEFAULT_ROD_MIN_AREA, DEFAULT_ROD_MIN_ASPECT,
};
use crate::error::{ColonyError, Result};

use super::region::RegionProps;

/// Shape category of a connected region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phenotype {
    RodLike,
    Elongated,
    Compact,
    Other,
}

impl Phenotype {
    pub const ALL: [Phenotype; 4] = [
        Phenotype::RodLike,
        Phenotype::Elongated,
        Phenotype::Compact,
        Phenotype::Other,
    ];
}

impl std::fmt::Display for Phenotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RodLike => write!(f, "rod_like"),
            Self::Elongated => write!(f, "elongated"),
            Self::Compact => write!(f, "compact"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Thresholds of the ordered classification rule chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeRules {
    #[serde(default = "default_elongated_min_aspect")]
    pub elongated_min_aspect: f64,
    #[serde(default = "default_rod_min_aspect")]
    pub rod_min_aspect: f64,
    /// Rod-like regions must be strictly larger than this.
    #[serde(default = "default_rod_min_area")]
    pub rod_min_area: usize,
    #[serde(default = "default_compact_max_aspect")]
    pub compact_max_aspect: f64,
    #[serde(default = "default_compact_min_solidity")]
    pub compact_min_solidity: f64,
}

fn default_elongated_min_aspect() -> f64 {
    DEFAULT_ELONGATED_MIN_ASPECT
}
fn default_rod_min_aspect() -> f64 {
    DEFAULT_ROD_MIN_ASPECT
}
fn default_rod_min_area() -> usize {
    DEFAULT_ROD_MIN_AREA
}
fn default_compact_max_aspect() -> f64 {
    DEFAULT_COMPACT_MAX_ASPECT
}
fn default_compact_min_solidity() -> f64 {
    DEFAULT_COMPACT_MIN_SOLIDITY
}

impl Default for PhenotypeRules {
    fn default() -> Self {
        Self {
            elongated_min_aspect: DEFAULT_ELONGATED_MIN_ASPECT,
            rod_min_aspect: DEFAULT_ROD_MIN_ASPECT,
            rod_min_area: DEFAULT_ROD_MIN_AREA,
            compact_max_aspect: DEFAULT_COMPACT_MAX_ASPECT,
            compact_min_solidity: DEFAULT_COMPACT_MIN_SOLIDITY,
        }
    }
}

impl PhenotypeRules {
    pub fn validate(&self) -> Result<()> {
        if self.rod_min_aspect > self.elongated_min_aspect {
            return Err(ColonyError::InvalidConfig(format!(
                "phenotype.rod_min_aspect ({}) exceeds elongated_min_aspect ({})",
                self.rod_min_aspect, self.elongated_min_aspect
            )));
        }
        if !(0.0..=1.0).contains(&self.compact_min_solidity) {
            return Err(ColonyError::InvalidConfig(format!(
                "phenotype.compact_min_solidity must be in [0, 1], got {}",
                self.compact_min_solidity
            )));
        }
        Ok(())
    }

    /// First matching rule wins.
    pub fn classify(&self, aspect_ratio: f64, area: usize, solidity: f64) -> Phenotype {
        if aspect_ratio >= self.elongated_min_aspect {
            Phenotype::Elongated
        } else if aspect_ratio >= self.rod_min_aspect {
            if area > self.rod_min_area {
                Phenotype::RodLike
            } else {
                Phenotype::Other
            }
        } else if aspect_ratio < self.compact_max_aspect && solidity >= self.compact_min_solidity {
            Phenotype::Compact
        } else {
            Phenotype::Other
        }
    }

    pub fn classify_region(&self, region: &RegionProps) -> Phenotype {
        self.classify(region.aspect_ratio(), region.area, region.solidity)
    }
}

/// Number of regions per phenotype in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenotypeCounts {
    pub rod_like: usize,
    pub elongated: usize,
    pub compact: usize,
    pub other: usize,
}

impl PhenotypeCounts {
    pub fn add(&mut self, phenotype: Phenotype) {
        *self.get_mut(phenotype) += 1;
    }

    pub fn get(&self, phenotype: Phenotype) -> usize {
        match phenotype {
            Phenotype::RodLike => self.rod_like,
            Phenotype::Elongated => self.elongated,
            Phenotype::Compact => self.compact,
            Phenotype::Other => self.other,
        }
    }

    fn get_mut(&mut self, phenotype: Phenotype) -> &mut usize {
        match phenotype {
            Phenotype::RodLike => &mut self.rod_like,
            Phenotype::Elongated => &mut self.elongated,
            Phenotype::Compact => &mut self.compact,
            Phenotype::Other => &mut self.other,
        }
    }

    pub fn total(&self) -> usize {
        self.rod_like + self.elongated + self.compact + self.other
    }
}
