/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default temporal window length (frames). Must be odd.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Default foreground probability threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Default minimum connected component area (pixels) kept by mask cleaning.
pub const DEFAULT_MIN_AREA: usize = 300;

/// Default elliptical erosion kernel size. 0 disables erosion.
pub const DEFAULT_EROSION_KERNEL: usize = 3;

/// Playback rate assumed for time-lapse datasets without timing information.
pub const DEFAULT_FPS: f64 = 2.0;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

// Optical flow (polynomial expansion) defaults.

/// Scale between consecutive pyramid layers.
pub const DEFAULT_PYR_SCALE: f64 = 0.5;

/// Number of coarser pyramid layers built below full resolution.
pub const DEFAULT_PYR_LEVELS: usize = 3;

/// Averaging window size for the displacement solve.
pub const DEFAULT_FLOW_WINDOW: usize = 15;

/// Displacement refinement iterations per pyramid layer.
pub const DEFAULT_FLOW_ITERATIONS: usize = 3;

/// Radius of the polynomial expansion neighborhood.
pub const DEFAULT_POLY_N: usize = 5;

/// Gaussian sigma of the polynomial expansion applicability.
pub const DEFAULT_POLY_SIGMA: f64 = 1.2;

/// Pyramid layers whose width or height would fall below this are not built.
pub const MIN_PYRAMID_SIZE: usize = 32;

/// Pixels near the image edge get their solve weight damped.
pub const FLOW_BORDER_WEIGHTS: [f32; 5] = [0.14, 0.14, 0.4472, 0.4472, 0.4472];

/// Tikhonov term added to the 2x2 displacement determinant.
pub const FLOW_REGULARIZATION: f64 = 1e-3;

// Phenotype classification defaults.

pub const DEFAULT_ELONGATED_MIN_ASPECT: f64 = 3.0;
pub const DEFAULT_ROD_MIN_ASPECT: f64 = 2.0;
/// Rod-like components must be strictly larger than this (pixels).
pub const DEFAULT_ROD_MIN_AREA: usize = 200;
pub const DEFAULT_COMPACT_MAX_ASPECT: f64 = 1.8;
pub const DEFAULT_COMPACT_MIN_SOLIDITY: f64 = 0.8;

/// Guards the bounding-box aspect ratio fallback against division by zero.
pub const ASPECT_EPSILON: f64 = 1e-6;

// Division detection defaults.

/// A growth spike exceeds mean + this many standard deviations.
pub const DEFAULT_GROWTH_SPIKE_STD: f64 = 2.0;

/// Minimum frame-to-frame increase in component count.
pub const DEFAULT_COMPONENT_INCREASE: i64 = 1;

/// Added to the previous biomass before taking the growth log-ratio.
pub const GROWTH_EPSILON: f64 = 1e-6;

// Progress checkpoints.

/// Inference progress is published roughly this many times per job.
pub const INFERENCE_PROGRESS_DIVISIONS: usize = 20;

/// Rendering progress is published roughly this many times per job.
pub const RENDER_PROGRESS_DIVISIONS: usize = 10;

/// Overlay blend weight of mask colors.
pub const OVERLAY_ALPHA: f32 = 0.4;

/// Prediction overlay color (orange).
pub const PRED_OVERLAY_COLOR: [u8; 3] = [255, 165, 0];

/// Ground-truth overlay color (green).
pub const GT_OVERLAY_COLOR: [u8; 3] = [0, 255, 0];

/// Banner drawn across frames flagged as division-like.
pub const DIVISION_BANNER_COLOR: [u8; 3] = [255, 0, 0];
pub const DIVISION_BANNER_HEIGHT: u32 = 40;
pub const DIVISION_BANNER_ALPHA: f32 = 0.3;

/// Caption bar stacked above each triplet panel.
pub const CAPTION_HEIGHT: u32 = 60;
/// Glyphs are 8x8 cells drawn at this many pixels per cell.
pub const CAPTION_GLYPH_SCALE: u32 = 2;
/// Horizontal inset of the left and right caption fields.
pub const CAPTION_MARGIN: u32 = 20;
pub const CAPTION_TIME_COLOR: [u8; 3] = [200, 200, 200];
