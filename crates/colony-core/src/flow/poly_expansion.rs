//! Local quadratic polynomial expansion.
//!
//! Around every pixel the image is approximated, in a Gaussian-weighted least
//! squares sense, by `f(p) ~ p^T A p + b^T p + c` with `p = (x, y)` relative
//! to the pixel. The fit is separable: three row correlations followed by six
//! column correlations give every projection onto the basis
//! `{1, x, y, x^2, y^2, xy}`, and the fixed Gram matrix of that basis turns
//! projections into coefficients.

use ndarray::{Array2, Zip};

use crate::filters::gaussian_blur::{convolve_cols, convolve_rows};

/// Per-pixel coefficients of the local quadratic model.
///
/// `A = [[axx, axy], [axy, ayy]]`, `b = [bx, by]`; x is the column axis.
#[derive(Clone, Debug)]
pub struct PolyCoeffs {
    pub bx: Array2<f32>,
    pub by: Array2<f32>,
    pub axx: Array2<f32>,
    pub ayy: Array2<f32>,
    pub axy: Array2<f32>,
}

impl PolyCoeffs {
    pub fn dim(&self) -> (usize, usize) {
        self.bx.dim()
    }

    /// Coefficients at an integer pixel, in `[bx, by, axx, ayy, axy]` order.
    pub fn at(&self, row: usize, col: usize) -> [f32; 5] {
        [
            self.bx[[row, col]],
            self.by[[row, col]],
            self.axx[[row, col]],
            self.ayy[[row, col]],
            self.axy[[row, col]],
        ]
    }
}

/// Applicability kernels and the inverted Gram terms for one (n, sigma) pair.
struct ExpansionBasis {
    k0: Vec<f32>,
    k1: Vec<f32>,
    k2: Vec<f32>,
    /// 1 / <x, x>, shared by both linear terms.
    inv_linear: f64,
    /// 1 / <xy, xy>.
    inv_cross: f64,
    /// Rows 1 and 2 of the inverse of the {1, x^2, y^2} Gram block.
    inv_quadratic: [[f64; 3]; 2],
}

impl ExpansionBasis {
    fn new(n: usize, sigma: f64) -> Self {
        let s2 = 2.0 * sigma * sigma;
        let offsets: Vec<f64> = (0..=2 * n).map(|i| i as f64 - n as f64).collect();
        let raw: Vec<f64> = offsets.iter().map(|x| (-x * x / s2).exp()).collect();
        let total: f64 = raw.iter().sum();
        let a: Vec<f64> = raw.iter().map(|v| v / total).collect();

        let m0: f64 = a.iter().sum();
        let m2: f64 = a.iter().zip(&offsets).map(|(w, x)| w * x * x).sum();
        let m4: f64 = a.iter().zip(&offsets).map(|(w, x)| w * x.powi(4)).sum();

        let gram = [
            [m0 * m0, m0 * m2, m0 * m2],
            [m0 * m2, m0 * m4, m2 * m2],
            [m0 * m2, m2 * m2, m0 * m4],
        ];
        let inv = invert3(&gram);

        Self {
            k0: a.iter().map(|&w| w as f32).collect(),
            k1: a.iter().zip(&offsets).map(|(w, x)| (w * x) as f32).collect(),
            k2: a.iter().zip(&offsets).map(|(w, x)| (w * x * x) as f32).collect(),
            inv_linear: 1.0 / (m0 * m2),
            inv_cross: 1.0 / (m2 * m2),
            inv_quadratic: [inv[1], inv[2]],
        }
    }
}

/// Fit the quadratic model at every pixel of `data`.
///
/// `n` is the neighborhood radius, `sigma` the Gaussian applicability width.
pub fn poly_expand(data: &Array2<f32>, n: usize, sigma: f64) -> PolyCoeffs {
    let basis = ExpansionBasis::new(n, sigma);

    let r0 = convolve_rows(data, &basis.k0);
    let r1 = convolve_rows(data, &basis.k1);
    let r2 = convolve_rows(data, &basis.k2);

    let d1 = convolve_cols(&r0, &basis.k0);
    let dx = convolve_cols(&r1, &basis.k0);
    let dy = convolve_cols(&r0, &basis.k1);
    let dxx = convolve_cols(&r2, &basis.k0);
    let dyy = convolve_cols(&r0, &basis.k2);
    let dxy = convolve_cols(&r1, &basis.k1);

    let inv_linear = basis.inv_linear as f32;
    let inv_cross = basis.inv_cross as f32;
    let [qxx, qyy] = basis.inv_quadratic;

    let mut axx = Array2::<f32>::zeros(data.dim());
    let mut ayy = Array2::<f32>::zeros(data.dim());
    Zip::from(&mut axx)
        .and(&mut ayy)
        .and(&d1)
        .and(&dxx)
        .and(&dyy)
        .for_each(|xx, yy, &c, &px, &py| {
            let (c, px, py) = (c as f64, px as f64, py as f64);
            *xx = (qxx[0] * c + qxx[1] * px + qxx[2] * py) as f32;
            *yy = (qyy[0] * c + qyy[1] * px + qyy[2] * py) as f32;
        });

    PolyCoeffs {
        bx: dx.mapv(|v| v * inv_linear),
        by: dy.mapv(|v| v * inv_linear),
        axx,
        ayy,
        // The fitted xy coefficient is split across both off-diagonal entries.
        axy: dxy.mapv(|v| v * inv_cross * 0.5),
    }
}

fn invert3(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
    let inv_det = 1.0 / det;

    [
        [
            c00 * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            c01 * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            c02 * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ]
}
