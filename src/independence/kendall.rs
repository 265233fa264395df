//! Kendall's tau-b for univariate samples.
//!
//! The p-value uses the normal approximation with the usual tie corrections
//! to the variance of `concordant - discordant`.

use crate::error::{HyppoError, Result};
use crate::independence::{IndependenceTest, require_1d};
use crate::matrix::Matrix;
use crate::tools::{PValueMethod, TestOptions, TestOutput, check_pair};
use statrs::distribution::{ContinuousCDF, Normal};

#[derive(Debug, Clone, Copy, Default)]
pub struct Kendall;

/// Tie summaries of one sample: `sum t(t-1)/2`, `sum t(t-1)(t-2)`,
/// `sum t(t-1)(2t+5)` over groups of `t` equal values.
fn tie_terms(v: &[f64]) -> (f64, f64, f64) {
    let mut sorted = v.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (mut pairs, mut t0, mut t1) = (0.0, 0.0, 0.0);
    for group in sorted.chunk_by(|a, b| a == b) {
        let t = group.len() as f64;
        pairs += t * (t - 1.0) / 2.0;
        t0 += t * (t - 1.0) * (t - 2.0);
        t1 += t * (t - 1.0) * (2.0 * t + 5.0);
    }
    (pairs, t0, t1)
}

/// `(tau_b, two-sided p-value)`.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    let n = x.len();
    let (mut con, mut dis) = (0.0, 0.0);
    for i in 0..n {
        for j in i + 1..n {
            if x[i] == x[j] || y[i] == y[j] {
                continue;
            }
            if (x[i] - x[j]).signum() == (y[i] - y[j]).signum() {
                con += 1.0;
            } else {
                dis += 1.0;
            }
        }
    }

    let nf = n as f64;
    let tot = nf * (nf - 1.0) / 2.0;
    let (xtie, x0, x1) = tie_terms(x);
    let (ytie, y0, y1) = tie_terms(y);
    if xtie == tot || ytie == tot {
        return Err(HyppoError::ZeroVariance);
    }

    let diff = con - dis;
    let tau = diff / ((tot - xtie).sqrt() * (tot - ytie).sqrt());

    let m = nf * (nf - 1.0);
    let var = (m * (2.0 * nf + 5.0) - x1 - y1) / 18.0
        + (2.0 * xtie * ytie) / m
        + x0 * y0 / (9.0 * m * (nf - 2.0));
    let z = diff / var.sqrt();
    let normal = Normal::new(0.0, 1.0).map_err(|e| HyppoError::Distribution(e.to_string()))?;
    let pvalue = (2.0 * normal.sf(z.abs())).min(1.0);
    Ok((tau.clamp(-1.0, 1.0), pvalue))
}

impl IndependenceTest for Kendall {
    fn name(&self) -> &'static str {
        "Kendall"
    }

    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        check_pair(x, y)?;
        require_1d("Kendall", x)?;
        require_1d("Kendall", y)?;
        Ok(kendall_tau(x.as_slice(), y.as_slice())?.0)
    }

    fn test(&self, x: &Matrix, y: &Matrix, _opts: &TestOptions) -> Result<TestOutput> {
        check_pair(x, y)?;
        require_1d("Kendall", x)?;
        require_1d("Kendall", y)?;
        let (tau, pvalue) = kendall_tau(x.as_slice(), y.as_slice())?;
        Ok(TestOutput::analytic(tau, pvalue, PValueMethod::Asymptotic))
    }
}
