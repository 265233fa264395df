//! Pearson product-moment and Spearman rank correlation for univariate
//! samples. Both report a two-sided p-value from Student's t with `n - 2`
//! degrees of freedom.

use crate::error::{HyppoError, Result};
use crate::independence::{IndependenceTest, require_1d};
use crate::matrix::Matrix;
use crate::tools::{PValueMethod, TestOptions, TestOutput, check_pair};
use statrs::distribution::{ContinuousCDF, StudentsT};

#[derive(Debug, Clone, Copy, Default)]
pub struct Pearson;

#[derive(Debug, Clone, Copy, Default)]
pub struct Spearman;

/// Sample correlation coefficient.
pub fn pearson_r(x: &[f64], y: &[f64]) -> Result<f64> {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(HyppoError::ZeroVariance);
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Ranks starting at 1; ties share their average rank.
pub fn average_ranks(v: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..v.len()).collect();
    order.sort_by(|&i, &j| v[i].total_cmp(&v[j]));
    let mut ranks = vec![0.0; v.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && v[order[end]] == v[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = avg;
        }
        start = end;
    }
    ranks
}

fn t_pvalue(r: f64, n: usize) -> Result<f64> {
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| HyppoError::Distribution(e.to_string()))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

fn univariate<'a>(
    name: &'static str,
    x: &'a Matrix,
    y: &'a Matrix,
) -> Result<(&'a [f64], &'a [f64])> {
    check_pair(x, y)?;
    require_1d(name, x)?;
    require_1d(name, y)?;
    Ok((x.as_slice(), y.as_slice()))
}

impl IndependenceTest for Pearson {
    fn name(&self) -> &'static str {
        "Pearson"
    }

    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        let (x, y) = univariate("Pearson", x, y)?;
        pearson_r(x, y)
    }

    fn test(&self, x: &Matrix, y: &Matrix, _opts: &TestOptions) -> Result<TestOutput> {
        let (xs, ys) = univariate("Pearson", x, y)?;
        let r = pearson_r(xs, ys)?;
        let pvalue = t_pvalue(r, xs.len())?;
        Ok(TestOutput::analytic(r, pvalue, PValueMethod::Asymptotic))
    }
}

impl IndependenceTest for Spearman {
    fn name(&self) -> &'static str {
        "Spearman"
    }

    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        let (x, y) = univariate("Spearman", x, y)?;
        pearson_r(&average_ranks(x), &average_ranks(y))
    }

    fn test(&self, x: &Matrix, y: &Matrix, _opts: &TestOptions) -> Result<TestOutput> {
        let (xs, ys) = univariate("Spearman", x, y)?;
        let rho = pearson_r(&average_ranks(xs), &average_ranks(ys))?;
        let pvalue = t_pvalue(rho, xs.len())?;
        Ok(TestOutput::analytic(rho, pvalue, PValueMethod::Asymptotic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_average_rank() {
        assert_eq!(average_ranks(&[10.0, 20.0, 20.0, 5.0]), vec![2.0, 3.5, 3.5, 1.0]);
    }
}
