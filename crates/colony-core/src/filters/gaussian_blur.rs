use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Apply Gaussian blur to a raw array using separable 1D convolution.
///
/// The kernel spans `radius` pixels on each side; image borders are
/// replicated.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f64, radius: usize) -> Array2<f32> {
    let kernel = gaussian_kernel(sigma, radius);
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

/// Normalized Gaussian weights for offsets `-radius..=radius`.
pub fn gaussian_kernel(sigma: f64, radius: usize) -> Vec<f32> {
    let s2 = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

/// Correlate every row with `kernel` (centered, odd length).
pub fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    build_rows(h, w, |row, out| {
        for (col, dst) in out.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_col = (col as isize + ki as isize - radius as isize)
                    .clamp(0, w as isize - 1) as usize;
                sum += data[[row, src_col]] * kv;
            }
            *dst = sum;
        }
    })
}

/// Correlate every column with `kernel` (centered, odd length).
pub fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    build_rows(h, w, |row, out| {
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_row = (row as isize + ki as isize - radius as isize)
                .clamp(0, h as isize - 1) as usize;
            let src = data.row(src_row);
            for (dst, &v) in out.iter_mut().zip(src.iter()) {
                *dst += v * kv;
            }
        }
    })
}

/// Normalized box filter of the given window size, borders replicated.
pub fn box_filter(data: &Array2<f32>, size: usize) -> Array2<f32> {
    let size = size.max(1);
    let kernel = vec![1.0 / size as f32; size];
    if size % 2 == 1 {
        return convolve_cols(&convolve_rows(data, &kernel), &kernel);
    }
    // Even windows are anchored one pixel left/up of center.
    let mut padded = kernel;
    padded.push(0.0);
    convolve_cols(&convolve_rows(data, &padded), &padded)
}

/// Fill an (h, w) array row by row, in parallel for large images.
fn build_rows<F>(h: usize, w: usize, fill: F) -> Array2<f32>
where
    F: Fn(usize, &mut [f32]) + Sync,
{
    let mut buf = vec![0.0f32; h * w];
    if w == 0 {
        return Array2::zeros((h, w));
    }
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        buf.par_chunks_mut(w)
            .enumerate()
            .for_each(|(row, out)| fill(row, out));
    } else {
        for (row, out) in buf.chunks_mut(w).enumerate() {
            fill(row, out);
        }
    }
    Array2::from_shape_vec((h, w), buf).unwrap_or_else(|_| Array2::zeros((h, w)))
}
