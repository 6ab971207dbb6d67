use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Elliptical structuring element inscribed in a `k x k` square.
///
/// Row `i` spans `c - dx ..= c + dx` around the center column `c = k/2`,
/// where `dx = round(c * sqrt(1 - (i - r)^2 / r^2))`. For `k = 3` this is a
/// plus-shaped cross.
pub fn ellipse_kernel(k: usize) -> Array2<bool> {
    let mut kernel = Array2::from_elem((k, k), false);
    if k == 0 {
        return kernel;
    }
    let r = (k / 2) as i64;
    let c = r;
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

    for i in 0..k {
        let dy = i as i64 - r;
        if dy.abs() > r {
            continue;
        }
        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i64;
        let j1 = (c - dx).max(0) as usize;
        let j2 = ((c + dx + 1) as usize).min(k);
        for j in j1..j2 {
            kernel[[i, j]] = true;
        }
    }
    kernel
}

/// Binary erosion: a pixel stays true only if every kernel pixel placed over
/// it lands on foreground. Pixels outside the image count as foreground, so
/// regions touching the border are not eaten from that side.
pub fn erode(mask: &Array2<bool>, kernel: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    let (kh, kw) = kernel.dim();
    if h == 0 || w == 0 || kh == 0 || kw == 0 {
        return mask.clone();
    }

    let anchor_r = (kh / 2) as isize;
    let anchor_c = (kw / 2) as isize;
    let offsets: Vec<(isize, isize)> = kernel
        .indexed_iter()
        .filter(|(_, &on)| on)
        .map(|((i, j), _)| (i as isize - anchor_r, j as isize - anchor_c))
        .collect();

    let erode_row = |row: usize, out: &mut [bool]| {
        for (col, px) in out.iter_mut().enumerate() {
            if !mask[[row, col]] {
                continue;
            }
            *px = offsets.iter().all(|&(dr, dc)| {
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if nr < 0 || nr >= h as isize || nc < 0 || nc >= w as isize {
                    return true;
                }
                mask[[nr as usize, nc as usize]]
            });
        }
    };

    let mut buf = vec![false; h * w];
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        buf.par_chunks_mut(w)
            .enumerate()
            .for_each(|(row, out)| erode_row(row, out));
    } else {
        buf.chunks_mut(w)
            .enumerate()
            .for_each(|(row, out)| erode_row(row, out));
    }

    Array2::from_shape_vec((h, w), buf).unwrap_or_else(|_| Array2::from_elem((h, w), false))
}
