//! Hilbert-Schmidt independence criterion (Hsic).
//!
//! Hsic is the kernel counterpart of [`Dcorr`](super::Dcorr): every
//! characteristic kernel induces a semimetric and vice versa. [`statistic`]
//! maps kernel similarity matrices `K` to distances `1 - K / max(K)` and takes
//! their distance covariance; the permutation test centers the kernel matrices
//! themselves. The default Gaussian kernel with the median bandwidth makes the
//! test consistent.
//!
//! [`statistic`]: IndependenceTest::statistic

use crate::error::Result;
use crate::independence::IndependenceTest;
use crate::independence::dcorr::{AUTO_MIN_SAMPLES, dcov};
use crate::matrix::Matrix;
use crate::tools::{
    Kernel, TestOptions, TestOutput, check_inputs, check_pair, check_square, chi2_approx,
    compute_kern, induced_distance, perm_test,
};

#[derive(Debug, Clone, Default)]
pub struct Hsic {
    /// Kernel for the within-sample similarities; [`Kernel::Precomputed`] when
    /// the inputs already are kernel matrices.
    pub kernel: Kernel,
    pub bias: bool,
}

impl Hsic {
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            bias: false,
        }
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    fn induced(&self, x: &Matrix, y: &Matrix) -> Result<(Matrix, Matrix)> {
        let (kx, ky) = compute_kern(x, y, &self.kernel)?;
        Ok((induced_distance(&kx), induced_distance(&ky)))
    }
}

impl IndependenceTest for Hsic {
    fn name(&self) -> &'static str {
        "Hsic"
    }

    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        check_pair(x, y)?;
        let (distx, disty) = self.induced(x, y)?;
        Ok(dcov(&distx, &disty, self.bias))
    }

    fn test(&self, x: &Matrix, y: &Matrix, opts: &TestOptions) -> Result<TestOutput> {
        check_inputs(x, y, opts.reps)?;
        if self.kernel.is_precomputed() {
            check_square(x)?;
            check_square(y)?;
        }

        if opts.auto && x.nrows() > AUTO_MIN_SAMPLES && opts.perm_blocks.is_none() {
            tracing::debug!(n = x.nrows(), "hsic: chi-square approximation");
            return chi2_approx(|a, b| self.statistic(a, b), x, y);
        }

        let (kx, ky) = compute_kern(x, y, &self.kernel)?;
        let bias = self.bias;
        perm_test(|a, b| Ok(dcov(a, b, bias)), &kx, &ky, opts, true)
    }
}
