//! Maximum mean discrepancy (MMD), the kernel two-sample test.
//!
//! The statistic is the biased estimate `mean Kxx + mean Kyy - 2 mean Kxy`
//! over the pooled kernel matrix.

use crate::error::Result;
use crate::ksample::energy::{group_means, pooled_perm_test};
use crate::ksample::{KSampleTest, check_groups, group_sizes, require_two};
use crate::matrix::Matrix;
use crate::tools::{Kernel, TestOptions, TestOutput, pairwise_kernels};

#[derive(Debug, Clone, Default)]
pub struct Mmd {
    pub kernel: Kernel,
}

impl Mmd {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    fn pooled(&self, inputs: &[Matrix]) -> Result<Matrix> {
        check_groups(inputs)?;
        require_two("MMD", inputs)?;
        pairwise_kernels(&Matrix::vstack(inputs)?, &self.kernel)
    }
}

fn mmd_stat(k: &Matrix, order: &[usize], sizes: &[usize]) -> f64 {
    let g = group_means(k, order, sizes);
    g[(0, 0)] + g[(1, 1)] - 2.0 * g[(0, 1)]
}

impl KSampleTest for Mmd {
    fn name(&self) -> &'static str {
        "MMD"
    }

    fn statistic(&self, inputs: &[Matrix]) -> Result<f64> {
        let pooled = self.pooled(inputs)?;
        let identity: Vec<usize> = (0..pooled.nrows()).collect();
        Ok(mmd_stat(&pooled, &identity, &group_sizes(inputs)))
    }

    fn test(&self, inputs: &[Matrix], opts: &TestOptions) -> Result<TestOutput> {
        let pooled = self.pooled(inputs)?;
        pooled_perm_test(&pooled, &group_sizes(inputs), opts, mmd_stat)
    }
}
