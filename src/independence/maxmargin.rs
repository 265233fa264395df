//! Maximal margin independence test.
//!
//! Runs a univariate test on every pair of columns `(x_i, y_j)` and keeps the
//! largest statistic. The p-value comes from permuting the rows of `y` and
//! recomputing that maximum.

use crate::error::Result;
use crate::independence::{IndepTestKind, IndependenceTest};
use crate::matrix::Matrix;
use crate::tools::{TestOptions, TestOutput, check_inputs, check_pair, perm_test};

pub struct MaxMargin {
    inner: Box<dyn IndependenceTest>,
}

impl MaxMargin {
    pub fn new(inner: Box<dyn IndependenceTest>) -> Self {
        Self { inner }
    }

    pub fn from_kind(kind: IndepTestKind) -> Self {
        Self::new(kind.build())
    }

    pub fn inner(&self) -> &dyn IndependenceTest {
        self.inner.as_ref()
    }
}

impl IndependenceTest for MaxMargin {
    fn name(&self) -> &'static str {
        "MaxMargin"
    }

    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        check_pair(x, y)?;
        let xs: Vec<Matrix> = (0..x.ncols()).map(|i| x.select_cols(&[i])).collect();
        let ys: Vec<Matrix> = (0..y.ncols()).map(|j| y.select_cols(&[j])).collect();
        let mut best = f64::NEG_INFINITY;
        for xi in &xs {
            for yj in &ys {
                best = best.max(self.inner.statistic(xi, yj)?);
            }
        }
        Ok(best)
    }

    fn test(&self, x: &Matrix, y: &Matrix, opts: &TestOptions) -> Result<TestOutput> {
        check_inputs(x, y, opts.reps)?;
        tracing::debug!(
            inner = self.inner.name(),
            pairs = x.ncols() * y.ncols(),
            "maxmargin: permutation test"
        );
        perm_test(|a, b| self.statistic(a, b), x, y, opts, false)
    }
}
