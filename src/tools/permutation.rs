//! Permutation null distributions and the chi-square shortcut.
//!
//! Replicate `r` draws its permutation from the ChaCha stream `(seed, r)`, so a
//! seeded run produces the same null distribution whatever the worker count.

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;
use crate::tools::blocks::PermutationTree;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Options shared by every `test` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestOptions {
    /// Replications used to estimate the permutation null distribution.
    pub reps: usize,
    /// Worker threads for the permutation replicates; `None` uses every core.
    pub workers: Option<usize>,
    /// Allow fast approximations (chi-square p-value for `n > 20`).
    pub auto: bool,
    /// Seed for the permutation streams; `None` draws one at random.
    pub seed: Option<u64>,
    /// Exchangeable blocks, one row of labels per sample.
    pub perm_blocks: Option<Vec<Vec<i64>>>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            reps: 1000,
            workers: None,
            auto: true,
            seed: None,
            perm_blocks: None,
        }
    }
}

impl TestOptions {
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_auto(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_perm_blocks(mut self, blocks: Vec<Vec<i64>>) -> Self {
        self.perm_blocks = Some(blocks);
        self
    }
}

/// How the p-value of a [`TestOutput`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    Permutation,
    Chi2,
    Asymptotic,
    FTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutput {
    pub stat: f64,
    pub pvalue: f64,
    /// Permutation null distribution, when one was computed.
    pub null_dist: Option<Vec<f64>>,
    pub method: PValueMethod,
}

impl TestOutput {
    pub fn permutation(stat: f64, pvalue: f64, null_dist: Vec<f64>) -> Self {
        Self {
            stat,
            pvalue,
            null_dist: Some(null_dist),
            method: PValueMethod::Permutation,
        }
    }

    pub fn analytic(stat: f64, pvalue: f64, method: PValueMethod) -> Self {
        Self {
            stat,
            pvalue,
            null_dist: None,
            method,
        }
    }
}

/// Evaluate `stat` on `opts.reps` random permutations of `0..n`.
///
/// When `opts.perm_blocks` is set the permutations respect those blocks.
pub fn null_distribution<F>(n: usize, opts: &TestOptions, stat: F) -> Result<Vec<f64>>
where
    F: Fn(&[usize]) -> Result<f64> + Sync,
{
    let tree = match &opts.perm_blocks {
        Some(blocks) => {
            let tree = PermutationTree::new(blocks)?;
            tree.check_len(n)?;
            Some(tree)
        }
        None => None,
    };
    let seed = opts.seed.unwrap_or_else(rand::random::<u64>);
    tracing::debug!(n, reps = opts.reps, seed, blocked = tree.is_some(), "permutation null");

    let run = || {
        (0..opts.reps)
            .into_par_iter()
            .map(|r| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(r as u64);
                let perm = match &tree {
                    Some(t) => t.permute(&mut rng),
                    None => {
                        let mut p: Vec<usize> = (0..n).collect();
                        p.shuffle(&mut rng);
                        p
                    }
                };
                stat(&perm)
            })
            .collect::<Result<Vec<f64>>>()
    };

    match opts.workers {
        Some(w) => rayon::ThreadPoolBuilder::new()
            .num_threads(w)
            .build()?
            .install(run),
        None => run(),
    }
}

/// `(1 + #{null >= stat}) / (1 + reps)`, floored at `1 / reps`.
pub fn perm_pvalue(stat: f64, null: &[f64]) -> f64 {
    let reps = null.len();
    if reps == 0 {
        return 1.0;
    }
    let exceed = null.iter().filter(|&&v| v >= stat).count();
    let pvalue = (1 + exceed) as f64 / (1 + reps) as f64;
    pvalue.max(1.0 / reps as f64)
}

/// Permutation test of `calc_stat` over `y`.
///
/// With `is_distsim` the inputs are distance or similarity matrices and `y`
/// is permuted on rows and columns; otherwise only its rows move.
pub fn perm_test<F>(
    calc_stat: F,
    x: &Matrix,
    y: &Matrix,
    opts: &TestOptions,
    is_distsim: bool,
) -> Result<TestOutput>
where
    F: Fn(&Matrix, &Matrix) -> Result<f64> + Sync,
{
    let stat = calc_stat(x, y)?;
    let null = null_distribution(y.nrows(), opts, |perm| {
        let permuted = if is_distsim {
            y.permute_square(perm)
        } else {
            y.select_rows(perm)
        };
        calc_stat(x, &permuted)
    })?;
    let pvalue = perm_pvalue(stat, &null);
    Ok(TestOutput::permutation(stat, pvalue, null))
}

/// Fast p-value: `P(chi2_1 > n * stat + 1)`.
pub fn chi2_approx<F>(calc_stat: F, x: &Matrix, y: &Matrix) -> Result<TestOutput>
where
    F: Fn(&Matrix, &Matrix) -> Result<f64>,
{
    let n = x.nrows() as f64;
    let stat = calc_stat(x, y)?;
    let chi2 = ChiSquared::new(1.0).map_err(|e| HyppoError::Distribution(e.to_string()))?;
    let pvalue = chi2.sf(stat * n + 1.0);
    Ok(TestOutput::analytic(stat, pvalue, PValueMethod::Chi2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pvalue_is_floored() {
        let null = vec![0.0; 1000];
        assert_eq!(perm_pvalue(1.0, &null), 1.0 / 1000.0);
        assert_eq!(perm_pvalue(0.0, &null), 1.0);
    }

    #[test]
    fn seeded_nulls_ignore_worker_count() {
        let opts = TestOptions::default().with_reps(50).with_seed(11);
        let stat = |p: &[usize]| Ok(p[0] as f64 + 10.0 * p[1] as f64);
        let a = null_distribution(8, &opts.clone().with_workers(1), stat).unwrap();
        let b = null_distribution(8, &opts.with_workers(3), stat).unwrap();
        assert_eq!(a, b);
    }
}
