//! Dense two-frame motion estimation from polynomial expansion.
//!
//! Both frames are expanded into local quadratic models. If the next frame
//! is the previous one displaced by `d`, the linear coefficients satisfy
//! `A d = (b_prev - b_next) / 2`. That relation is solved in a least-squares
//! sense over a box neighborhood, iteratively refined, and propagated from
//! the coarsest pyramid layer down to full resolution.

use ndarray::Array2;

use crate::consts::{FLOW_BORDER_WEIGHTS, FLOW_REGULARIZATION};
use crate::error::{ColonyError, Result};
use crate::filters::gaussian_blur::box_filter;

use super::poly_expansion::{poly_expand, PolyCoeffs};
use super::pyramid::{build_pyramid, usable_levels};
use super::{FlowField, FlowParams};

/// Estimate the displacement of every pixel of `prev` in `next`.
///
/// Inputs are expected in the 8-bit intensity domain ([0, 255]). The result
/// maps `prev[y, x]` to `next[y + dy, x + dx]`.
pub fn estimate_flow(
    prev: &Array2<f32>,
    next: &Array2<f32>,
    params: &FlowParams,
) -> Result<FlowField> {
    if prev.dim() != next.dim() {
        return Err(ColonyError::ShapeMismatch {
            expected: prev.dim(),
            actual: next.dim(),
            context: "optical flow frame pair".into(),
        });
    }
    let (h, w) = prev.dim();
    if h == 0 || w == 0 {
        return Ok(FlowField::zeros(h, w));
    }

    let levels = usable_levels(h, w, params.pyr_scale, params.levels);
    let prev_pyramid = build_pyramid(prev, params.pyr_scale, levels);
    let next_pyramid = build_pyramid(next, params.pyr_scale, levels);
    let iterations = params.iterations.max(1);

    let mut flow: Option<FlowField> = None;

    // Iterate from coarsest (last) to finest (first = original)
    for level in (0..=levels).rev() {
        let (lh, lw) = prev_pyramid[level].dim();
        let mut field = match flow.take() {
            None => FlowField::zeros(lh, lw),
            Some(coarse) => coarse.upscaled(lh, lw, 1.0 / params.pyr_scale as f32),
        };

        let expansion_prev = poly_expand(&prev_pyramid[level], params.poly_n, params.poly_sigma);
        let expansion_next = poly_expand(&next_pyramid[level], params.poly_n, params.poly_sigma);

        let mut system = build_system(&expansion_prev, &expansion_next, &field);
        for i in 0..iterations {
            field = solve_system(&system, params.win_size);
            if i + 1 < iterations {
                system = build_system(&expansion_prev, &expansion_next, &field);
            }
        }
        flow = Some(field);
    }

    Ok(flow.unwrap_or_else(|| FlowField::zeros(h, w)))
}

/// Per-pixel normal equations `G d = h`, stored as (g11, g12, g22, h1, h2).
struct NormalEquations {
    g11: Array2<f32>,
    g12: Array2<f32>,
    g22: Array2<f32>,
    h1: Array2<f32>,
    h2: Array2<f32>,
}

fn build_system(prev: &PolyCoeffs, next: &PolyCoeffs, flow: &FlowField) -> NormalEquations {
    let (h, w) = prev.dim();
    let mut eq = NormalEquations {
        g11: Array2::zeros((h, w)),
        g12: Array2::zeros((h, w)),
        g22: Array2::zeros((h, w)),
        h1: Array2::zeros((h, w)),
        h2: Array2::zeros((h, w)),
    };

    for row in 0..h {
        let wy = border_weight(row, h);
        for col in 0..w {
            let dx = flow.dx[[row, col]];
            let dy = flow.dy[[row, col]];
            let [b1x, b1y, a1xx, a1yy, a1xy] = prev.at(row, col);

            let fx = col as f32 + dx;
            let fy = row as f32 + dy;
            let inside = fx >= 0.0 && fy >= 0.0 && fx <= (w - 1) as f32 && fy <= (h - 1) as f32;
            // Targets leaving the frame keep the reference model, which holds
            // the current estimate in place.
            let [b2x, b2y, a2xx, a2yy, a2xy] = if inside {
                sample_coeffs(next, fy, fx)
            } else {
                [b1x, b1y, a1xx, a1yy, a1xy]
            };

            let axx = (a1xx + a2xx) * 0.5;
            let ayy = (a1yy + a2yy) * 0.5;
            let axy = (a1xy + a2xy) * 0.5;

            let ex = (b1x - b2x) * 0.5 + axx * dx + axy * dy;
            let ey = (b1y - b2y) * 0.5 + axy * dx + ayy * dy;

            let weight = wy * border_weight(col, w);
            eq.g11[[row, col]] = (axx * axx + axy * axy) * weight;
            eq.g12[[row, col]] = axy * (axx + ayy) * weight;
            eq.g22[[row, col]] = (axy * axy + ayy * ayy) * weight;
            eq.h1[[row, col]] = (axx * ex + axy * ey) * weight;
            eq.h2[[row, col]] = (axy * ex + ayy * ey) * weight;
        }
    }

    eq
}

fn solve_system(eq: &NormalEquations, win_size: usize) -> FlowField {
    let g11 = box_filter(&eq.g11, win_size);
    let g12 = box_filter(&eq.g12, win_size);
    let g22 = box_filter(&eq.g22, win_size);
    let h1 = box_filter(&eq.h1, win_size);
    let h2 = box_filter(&eq.h2, win_size);

    let (h, w) = g11.dim();
    let mut field = FlowField::zeros(h, w);
    for row in 0..h {
        for col in 0..w {
            let a = g11[[row, col]] as f64;
            let b = g12[[row, col]] as f64;
            let c = g22[[row, col]] as f64;
            let r1 = h1[[row, col]] as f64;
            let r2 = h2[[row, col]] as f64;
            let idet = 1.0 / ((a * c - b * b).max(0.0) + FLOW_REGULARIZATION);
            field.dx[[row, col]] = ((c * r1 - b * r2) * idet) as f32;
            field.dy[[row, col]] = ((a * r2 - b * r1) * idet) as f32;
        }
    }
    field
}

fn border_weight(pos: usize, len: usize) -> f32 {
    let n = FLOW_BORDER_WEIGHTS.len();
    let mut weight = 1.0;
    if pos < n {
        weight *= FLOW_BORDER_WEIGHTS[pos];
    }
    if pos + n >= len {
        weight *= FLOW_BORDER_WEIGHTS[len - 1 - pos];
    }
    weight
}

/// Bilinear sample of all five coefficient planes; (fy, fx) must be in bounds.
fn sample_coeffs(coeffs: &PolyCoeffs, fy: f32, fx: f32) -> [f32; 5] {
    let (h, w) = coeffs.dim();
    let y0 = fy.floor() as usize;
    let x0 = fx.floor() as usize;
    let y1 = (y0 + 1).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let ty = fy - y0 as f32;
    let tx = fx - x0 as f32;

    let c00 = coeffs.at(y0, x0);
    let c01 = coeffs.at(y0, x1);
    let c10 = coeffs.at(y1, x0);
    let c11 = coeffs.at(y1, x1);

    let mut out = [0.0f32; 5];
    for (k, v) in out.iter_mut().enumerate() {
        let top = c00[k] * (1.0 - tx) + c01[k] * tx;
        let bottom = c10[k] * (1.0 - tx) + c11[k] * tx;
        *v = top * (1.0 - ty) + bottom * ty;
    }
    out
}
