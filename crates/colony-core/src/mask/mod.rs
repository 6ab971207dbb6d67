pub mod cleaner;
pub mod components;
pub mod morphology;

use ndarray::Array2;

/// Per-pixel foreground mask.
pub type BinaryMask = Array2<bool>;

/// Per-pixel foreground probability in [0, 1].
pub type ProbabilityMask = Array2<f32>;

pub use cleaner::{clean_mask, count_foreground, remove_small_components, threshold_mask, CleanParams};
pub use components::{label_components, ComponentLabels, ComponentStats};
pub use morphology::{ellipse_kernel, erode};
