//! Distance correlation (Dcorr).
//!
//! Dcorr measures dependence between paired random vectors of possibly
//! different dimensions; in the population it is zero exactly when the
//! vectors are independent.
//!
//! For distance matrices `Dx`, `Dy` the biased statistic double-centres each
//! matrix (`C = H D H`, `H = I - J/n`) and takes `tr(Cx Cy) / n^2`. The
//! unbiased version centres with
//!
//! ```text
//! C_ij = D_ij - rowsum_i/(n-2) - colsum_j/(n-2) + total/((n-1)(n-2)),  C_ii = 0
//! ```
//!
//! and divides by `n (n - 3)`. Dcorr normalises the covariance by
//! `sqrt(dcov(x, x) dcov(y, y))`.

use crate::error::Result;
use crate::independence::IndependenceTest;
use crate::independence::fast_dcov::fast_dcorr;
use crate::matrix::Matrix;
use crate::tools::{
    Metric, TestOptions, TestOutput, check_inputs, check_pair, check_square, chi2_approx,
    compute_dist, perm_test,
};

/// Above this many samples `auto` switches to the chi-square approximation.
pub const AUTO_MIN_SAMPLES: usize = 20;

/// Centre a distance matrix, biased (double centring) or unbiased.
pub fn center_distmat(dist: &Matrix, bias: bool) -> Matrix {
    let n = dist.nrows();
    let nf = n as f64;
    let rows = dist.row_sums();
    let cols = dist.col_sums();
    let total = dist.sum();
    let (div, grand) = if bias {
        (nf, total / (nf * nf))
    } else {
        (nf - 2.0, total / ((nf - 1.0) * (nf - 2.0)))
    };
    Matrix::from_fn(n, n, |i, j| {
        if !bias && i == j {
            return 0.0;
        }
        dist[(i, j)] - rows[i] / div - cols[j] / div + grand
    })
}

/// Distance covariance of two distance matrices.
pub fn dcov(distx: &Matrix, disty: &Matrix, bias: bool) -> f64 {
    let n = distx.nrows() as f64;
    let cx = center_distmat(distx, bias);
    let cy = center_distmat(disty, bias);
    let norm = if bias { n * n } else { n * (n - 3.0) };
    cx.frobenius_dot(&cy) / norm
}

/// Distance correlation of two distance matrices; 0 when either variance is
/// not positive.
pub fn dcorr(distx: &Matrix, disty: &Matrix, bias: bool) -> f64 {
    let cx = center_distmat(distx, bias);
    let cy = center_distmat(disty, bias);
    let covar = cx.frobenius_dot(&cy);
    let varx = cx.frobenius_dot(&cx);
    let vary = cy.frobenius_dot(&cy);
    if varx <= 0.0 || vary <= 0.0 {
        return 0.0;
    }
    covar / (varx * vary).sqrt()
}

/// Distance correlation test.
#[derive(Debug, Clone, Default)]
pub struct Dcorr {
    /// Metric for the within-sample distances; [`Metric::Precomputed`] when the
    /// inputs already are distance matrices.
    pub metric: Metric,
    pub bias: bool,
}

impl Dcorr {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            bias: false,
        }
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Univariate Euclidean inputs take the `O(n log n)` path.
    fn is_fast(&self, x: &Matrix, y: &Matrix) -> bool {
        self.metric.is_euclidean() && x.ncols() == 1 && y.ncols() == 1
    }
}

impl IndependenceTest for Dcorr {
    fn name(&self) -> &'static str {
        "Dcorr"
    }

    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        check_pair(x, y)?;
        if self.is_fast(x, y) {
            return Ok(fast_dcorr(x.as_slice(), y.as_slice(), self.bias));
        }
        let (distx, disty) = compute_dist(x, y, &self.metric)?;
        Ok(dcorr(&distx, &disty, self.bias))
    }

    fn test(&self, x: &Matrix, y: &Matrix, opts: &TestOptions) -> Result<TestOutput> {
        check_inputs(x, y, opts.reps)?;
        if self.metric.is_precomputed() {
            check_square(x)?;
            check_square(y)?;
        }

        if opts.auto && x.nrows() > AUTO_MIN_SAMPLES && opts.perm_blocks.is_none() {
            tracing::debug!(n = x.nrows(), "dcorr: chi-square approximation");
            return chi2_approx(|a, b| self.statistic(a, b), x, y);
        }

        if self.is_fast(x, y) {
            tracing::debug!(n = x.nrows(), "dcorr: permutation test on raw 1-d data");
            return perm_test(|a, b| self.statistic(a, b), x, y, opts, false);
        }

        let (distx, disty) = compute_dist(x, y, &self.metric)?;
        let bias = self.bias;
        perm_test(|a, b| Ok(dcorr(a, b, bias)), &distx, &disty, opts, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_matches_distance_matrices() {
        let x = Matrix::column(&[0.1, 1.7, -0.4, 2.2, 0.9, -1.3, 3.1, 0.0]);
        let y = Matrix::column(&[1.0, 0.2, -0.8, 1.9, 1.1, 0.4, 2.5, -0.1]);
        for bias in [false, true] {
            let (dx, dy) = compute_dist(&x, &y, &Metric::Euclidean).unwrap();
            let slow = dcorr(&dx, &dy, bias);
            let fast = fast_dcorr(x.as_slice(), y.as_slice(), bias);
            assert!((slow - fast).abs() < 1e-10, "bias={bias}: {slow} vs {fast}");
        }
    }
}
