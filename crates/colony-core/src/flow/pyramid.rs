//! Gaussian image pyramid for coarse-to-fine flow estimation.
//!
//! Each coarser layer is produced from the full-resolution image directly:
//! blur with a sigma matched to the layer's scale, then resample. Layers
//! that would be smaller than [`MIN_PYRAMID_SIZE`] on either side are not
//! built, which truncates the pyramid for small frames.

use ndarray::Array2;

use crate::consts::MIN_PYRAMID_SIZE;
use crate::filters::gaussian_blur::gaussian_blur_array;

/// Number of coarser layers that fit below an (h, w) image.
pub fn usable_levels(h: usize, w: usize, scale: f64, requested: usize) -> usize {
    let mut factor = 1.0;
    let mut levels = 0;
    for k in 0..requested {
        factor *= scale;
        if (w as f64 * factor) < MIN_PYRAMID_SIZE as f64
            || (h as f64 * factor) < MIN_PYRAMID_SIZE as f64
        {
            break;
        }
        levels = k + 1;
    }
    levels
}

/// Size of pyramid layer `level` for an (h, w) image.
pub fn level_size(h: usize, w: usize, scale: f64, level: usize) -> (usize, usize) {
    let factor = scale.powi(level as i32);
    let lh = ((h as f64 * factor).round() as usize).max(1);
    let lw = ((w as f64 * factor).round() as usize).max(1);
    (lh, lw)
}

/// Build `levels + 1` layers; index 0 is the original, `levels` the coarsest.
pub fn build_pyramid(data: &Array2<f32>, scale: f64, levels: usize) -> Vec<Array2<f32>> {
    let (h, w) = data.dim();
    let mut pyramid = Vec::with_capacity(levels + 1);
    pyramid.push(data.clone());

    for level in 1..=levels {
        let factor = scale.powi(level as i32);
        let sigma = (1.0 / factor - 1.0) * 0.5;
        let ksize = (((sigma * 5.0).round() as usize) | 1).max(3);
        let blurred = gaussian_blur_array(data, sigma, ksize / 2);
        let (lh, lw) = level_size(h, w, scale, level);
        pyramid.push(resize_bilinear(&blurred, lh, lw));
    }

    pyramid
}

/// Resample to (new_h, new_w) with pixel-center aligned bilinear interpolation.
pub fn resize_bilinear(data: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if (h, w) == (new_h, new_w) {
        return data.clone();
    }
    let sy = h as f32 / new_h as f32;
    let sx = w as f32 / new_w as f32;
    let mut result = Array2::<f32>::zeros((new_h, new_w));

    for r in 0..new_h {
        let fy = ((r as f32 + 0.5) * sy - 0.5).clamp(0.0, (h - 1) as f32);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(h - 1);
        let ty = fy - y0 as f32;
        for c in 0..new_w {
            let fx = ((c as f32 + 0.5) * sx - 0.5).clamp(0.0, (w - 1) as f32);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(w - 1);
            let tx = fx - x0 as f32;
            let top = data[[y0, x0]] * (1.0 - tx) + data[[y0, x1]] * tx;
            let bottom = data[[y1, x0]] * (1.0 - tx) + data[[y1, x1]] * tx;
            result[[r, c]] = top * (1.0 - ty) + bottom * ty;
        }
    }

    result
}
