//! Energy distance (two groups) and distance components, DISCO (k groups).
//!
//! Both work on the pooled distance matrix. With `g(a, b)` the mean distance
//! between members of groups `a` and `b` (diagonal zeros included):
//!
//! ```text
//! energy = n1 n2 / (n1 + n2) * (2 g(1,2) - g(1,1) - g(2,2))
//! between = sum_{a<b} n_a n_b / (2N) * (2 g(a,b) - g(a,a) - g(b,b))
//! within  = sum_a n_a / 2 * g(a,a)
//! disco   = (between / (k - 1)) / (within / (N - k))
//! ```
//!
//! P-values come from permuting group membership over the pooled sample.

use crate::error::{HyppoError, Result};
use crate::ksample::{KSampleTest, check_groups, group_sizes, require_two};
use crate::matrix::Matrix;
use crate::tools::{
    Metric, TestOptions, TestOutput, check_reps, null_distribution, pairwise_distances,
    perm_pvalue,
};

/// Mean entry of `d` between every pair of groups, reading row `i` of the
/// pooled sample as `order[i]`. Groups occupy consecutive runs of `sizes`.
pub(crate) fn group_means(d: &Matrix, order: &[usize], sizes: &[usize]) -> Matrix {
    let k = sizes.len();
    let mut starts = Vec::with_capacity(k + 1);
    starts.push(0);
    for s in sizes {
        starts.push(starts.last().copied().unwrap_or(0) + s);
    }
    Matrix::from_fn(k, k, |a, b| {
        let mut sum = 0.0;
        for i in starts[a]..starts[a + 1] {
            let row = d.row(order[i]);
            for j in starts[b]..starts[b + 1] {
                sum += row[order[j]];
            }
        }
        sum / (sizes[a] * sizes[b]) as f64
    })
}

/// Statistic on the pooled matrix plus its permutation p-value.
pub(crate) fn pooled_perm_test<F>(
    pooled: &Matrix,
    sizes: &[usize],
    opts: &TestOptions,
    stat: F,
) -> Result<TestOutput>
where
    F: Fn(&Matrix, &[usize], &[usize]) -> f64 + Sync,
{
    check_reps(opts.reps)?;
    let n = pooled.nrows();
    let identity: Vec<usize> = (0..n).collect();
    let observed = stat(pooled, &identity, sizes);
    let null = null_distribution(n, opts, |perm| Ok(stat(pooled, perm, sizes)))?;
    let pvalue = perm_pvalue(observed, &null);
    Ok(TestOutput::permutation(observed, pvalue, null))
}

fn energy_stat(d: &Matrix, order: &[usize], sizes: &[usize]) -> f64 {
    let g = group_means(d, order, sizes);
    let (n1, n2) = (sizes[0] as f64, sizes[1] as f64);
    n1 * n2 / (n1 + n2) * (2.0 * g[(0, 1)] - g[(0, 0)] - g[(1, 1)])
}

/// `None` when every group is constant, so `within` is zero.
fn disco_stat(d: &Matrix, order: &[usize], sizes: &[usize]) -> Option<f64> {
    let g = group_means(d, order, sizes);
    let k = sizes.len();
    let total: usize = sizes.iter().sum();
    let nf = total as f64;
    let mut between = 0.0;
    for a in 0..k {
        for b in a + 1..k {
            let e = 2.0 * g[(a, b)] - g[(a, a)] - g[(b, b)];
            between += (sizes[a] * sizes[b]) as f64 / (2.0 * nf) * e;
        }
    }
    let within: f64 = (0..k).map(|a| sizes[a] as f64 / 2.0 * g[(a, a)]).sum();
    if within <= 0.0 {
        return None;
    }
    Some((between / (k - 1) as f64) / (within / (total - k) as f64))
}

/// Two-sample energy distance test.
#[derive(Debug, Clone, Default)]
pub struct Energy {
    pub metric: Metric,
}

impl Energy {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl KSampleTest for Energy {
    fn name(&self) -> &'static str {
        "Energy"
    }

    fn statistic(&self, inputs: &[Matrix]) -> Result<f64> {
        check_groups(inputs)?;
        require_two("Energy", inputs)?;
        let pooled = pairwise_distances(&Matrix::vstack(inputs)?, &self.metric)?;
        let identity: Vec<usize> = (0..pooled.nrows()).collect();
        Ok(energy_stat(&pooled, &identity, &group_sizes(inputs)))
    }

    fn test(&self, inputs: &[Matrix], opts: &TestOptions) -> Result<TestOutput> {
        check_groups(inputs)?;
        require_two("Energy", inputs)?;
        let pooled = pairwise_distances(&Matrix::vstack(inputs)?, &self.metric)?;
        pooled_perm_test(&pooled, &group_sizes(inputs), opts, energy_stat)
    }
}

/// Distance components (DISCO) F-ratio test for `k` groups.
#[derive(Debug, Clone, Default)]
pub struct Disco {
    pub metric: Metric,
}

impl Disco {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl KSampleTest for Disco {
    fn name(&self) -> &'static str {
        "DISCO"
    }

    fn statistic(&self, inputs: &[Matrix]) -> Result<f64> {
        check_groups(inputs)?;
        let pooled = pairwise_distances(&Matrix::vstack(inputs)?, &self.metric)?;
        let identity: Vec<usize> = (0..pooled.nrows()).collect();
        disco_stat(&pooled, &identity, &group_sizes(inputs)).ok_or(HyppoError::ZeroVariance)
    }

    fn test(&self, inputs: &[Matrix], opts: &TestOptions) -> Result<TestOutput> {
        check_groups(inputs)?;
        let pooled = pairwise_distances(&Matrix::vstack(inputs)?, &self.metric)?;
        let sizes = group_sizes(inputs);
        let identity: Vec<usize> = (0..pooled.nrows()).collect();
        disco_stat(&pooled, &identity, &sizes).ok_or(HyppoError::ZeroVariance)?;
        // a relabeling with constant groups ranks above every finite ratio
        pooled_perm_test(&pooled, &sizes, opts, |d, order, sizes| {
            disco_stat(d, order, sizes).unwrap_or(f64::MAX)
        })
    }
}
