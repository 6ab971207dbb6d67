//! Growth and topology anomaly detection over a whole biomass series.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_COMPONENT_INCREASE, DEFAULT_GROWTH_SPIKE_STD, GROWTH_EPSILON};
use crate::error::{ColonyError, Result};

/// How the growth-spike and component-increase signals combine into an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPolicy {
    /// Either signal flags the frame.
    #[default]
    Either,
    /// Both signals must agree.
    Both,
    GrowthOnly,
    TopologyOnly,
}

impl EventPolicy {
    pub fn combine(self, growth_spike: bool, component_increase: bool) -> bool {
        match self {
            Self::Either => growth_spike || component_increase,
            Self::Both => growth_spike && component_increase,
            Self::GrowthOnly => growth_spike,
            Self::TopologyOnly => component_increase,
        }
    }
}

impl std::fmt::Display for EventPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Either => write!(f, "either"),
            Self::Both => write!(f, "both"),
            Self::GrowthOnly => write!(f, "growth_only"),
            Self::TopologyOnly => write!(f, "topology_only"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivisionParams {
    /// Growth spike: rate above mean + this many population std devs.
    #[serde(default = "default_growth_spike_std")]
    pub growth_spike_std: f64,
    /// Minimum frame-to-frame increase in component count.
    #[serde(default = "default_component_increase")]
    pub component_increase_threshold: i64,
    #[serde(default)]
    pub policy: EventPolicy,
}

fn default_growth_spike_std() -> f64 {
    DEFAULT_GROWTH_SPIKE_STD
}
fn default_component_increase() -> i64 {
    DEFAULT_COMPONENT_INCREASE
}

impl Default for DivisionParams {
    fn default() -> Self {
        Self {
            growth_spike_std: DEFAULT_GROWTH_SPIKE_STD,
            component_increase_threshold: DEFAULT_COMPONENT_INCREASE,
            policy: EventPolicy::Either,
        }
    }
}

impl DivisionParams {
    pub fn validate(&self) -> Result<()> {
        if !self.growth_spike_std.is_finite() || self.growth_spike_std < 0.0 {
            return Err(ColonyError::InvalidConfig(format!(
                "division.growth_spike_std must be a non-negative number, got {}",
                self.growth_spike_std
            )));
        }
        Ok(())
    }
}

/// Log growth rate between consecutive frames: `g[i-1] = ln(b[i] / (b[i-1] + eps))`,
/// or 0 when `b[i-1]` is 0. Length is `n - 1`.
///
/// A frame whose biomass drops to zero yields negative infinity.
pub fn growth_rates(biomass: &[usize]) -> Vec<f64> {
    biomass
        .windows(2)
        .map(|pair| {
            if pair[0] > 0 {
                (pair[1] as f64 / (pair[0] as f64 + GROWTH_EPSILON)).ln()
            } else {
                0.0
            }
        })
        .collect()
}

/// Growth rate per frame, with the first frame defined as 0. Length is `n`.
pub fn growth_series(biomass: &[usize]) -> Vec<f64> {
    if biomass.is_empty() {
        return Vec::new();
    }
    std::iter::once(0.0).chain(growth_rates(biomass)).collect()
}

/// Flag frames whose growth spikes or whose component count jumps.
///
/// Growth rate `i` (1-based past the first rate) describes the transition
/// into frame `i + 1`; that frame index is what gets flagged. Fewer than
/// three frames never produce events.
pub fn detect_division_events(
    biomass: &[usize],
    component_counts: &[usize],
    params: &DivisionParams,
) -> BTreeSet<usize> {
    let mut events = BTreeSet::new();
    if biomass.len() < 3 {
        return events;
    }

    let rates = growth_rates(biomass);
    let n = rates.len() as f64;
    let mean = rates.iter().sum::<f64>() / n;
    let std = (rates.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n).sqrt();
    let spike_level = mean + params.growth_spike_std * std;

    for (i, &rate) in rates.iter().enumerate().skip(1) {
        let frame_idx = i + 1;
        let growth_spike = std > 0.0 && rate > spike_level;
        let component_increase = frame_idx < component_counts.len()
            && component_counts[frame_idx] as i64 - component_counts[frame_idx - 1] as i64
                >= params.component_increase_threshold;

        if params.policy.combine(growth_spike, component_increase) {
            events.insert(frame_idx);
        }
    }

    debug!(
        frames = biomass.len(),
        mean_growth = mean,
        std_growth = std,
        events = events.len(),
        "Division detection"
    );
    events
}
