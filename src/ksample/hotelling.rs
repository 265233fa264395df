//! Parametric k-sample baselines: Hotelling's two-sample `T^2` and MANOVA with
//! Pillai's trace. Both assume Gaussian groups with a shared covariance and
//! report F-test p-values, so `reps` and `workers` are unused.

use crate::error::{HyppoError, Result};
use crate::ksample::{KSampleTest, check_groups, require_two};
use crate::matrix::Matrix;
use crate::tools::{PValueMethod, TestOptions, TestOutput};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

fn column_means(m: &DMatrix<f64>) -> DVector<f64> {
    m.row_mean().transpose()
}

/// `sum_i (x_i - mean)(x_i - mean)^T`.
fn scatter(m: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    let centered = DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)] - mean[j]);
    centered.tr_mul(&centered)
}

fn f_sf(f: f64, df1: f64, df2: f64) -> Result<f64> {
    let dist =
        FisherSnedecor::new(df1, df2).map_err(|e| HyppoError::Distribution(e.to_string()))?;
    Ok(dist.sf(f))
}

/// Hotelling's two-sample `T^2` test.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hotelling;

impl Hotelling {
    /// `(T^2, F, df1, df2)`.
    fn compute(inputs: &[Matrix]) -> Result<(f64, f64, f64, f64)> {
        check_groups(inputs)?;
        require_two("Hotelling", inputs)?;
        let (x, y) = (&inputs[0], &inputs[1]);
        let (n1, n2) = (x.nrows() as f64, y.nrows() as f64);
        let p = x.ncols() as f64;
        let df2 = n1 + n2 - p - 1.0;
        if df2 < 1.0 {
            return Err(HyppoError::InvalidArgument(format!(
                "Hotelling needs n1 + n2 > p + 1 (n1={n1}, n2={n2}, p={p})"
            )));
        }

        let (x, y) = (DMatrix::<f64>::from(x), DMatrix::<f64>::from(y));
        let (mx, my) = (column_means(&x), column_means(&y));
        let pooled = (scatter(&x, &mx) + scatter(&y, &my)) / (n1 + n2 - 2.0);
        let diff = mx - my;
        let chol = pooled.cholesky().ok_or(HyppoError::Singular)?;
        let quad = diff.dot(&chol.solve(&diff));

        let t2 = n1 * n2 / (n1 + n2) * quad;
        let f = df2 / (p * (n1 + n2 - 2.0)) * t2;
        Ok((t2, f, p, df2))
    }
}

impl KSampleTest for Hotelling {
    fn name(&self) -> &'static str {
        "Hotelling"
    }

    fn statistic(&self, inputs: &[Matrix]) -> Result<f64> {
        Ok(Self::compute(inputs)?.0)
    }

    fn test(&self, inputs: &[Matrix], _opts: &TestOptions) -> Result<TestOutput> {
        let (t2, f, df1, df2) = Self::compute(inputs)?;
        let pvalue = f_sf(f, df1, df2)?;
        Ok(TestOutput::analytic(t2, pvalue, PValueMethod::FTest))
    }
}

/// One-way MANOVA using Pillai's trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manova;

impl Manova {
    /// `(pillai, F, df1, df2)`.
    fn compute(inputs: &[Matrix]) -> Result<(f64, f64, f64, f64)> {
        check_groups(inputs)?;
        let pooled = Matrix::vstack(inputs)?;
        let p = pooled.ncols();
        let grand = column_means(&DMatrix::<f64>::from(&pooled));

        let mut hyp = DMatrix::<f64>::zeros(p, p);
        let mut err = DMatrix::<f64>::zeros(p, p);
        for g in inputs {
            let g = DMatrix::<f64>::from(g);
            let mean = column_means(&g);
            let d = &mean - &grand;
            hyp += (&d * d.transpose()) * g.nrows() as f64;
            err += scatter(&g, &mean);
        }
        // tr(H (H + E)^-1) = tr((H + E)^-1 H)
        let total = &hyp + &err;
        let pillai = total
            .cholesky()
            .ok_or(HyppoError::Singular)?
            .solve(&hyp)
            .trace();

        let (n, k, pf) = (pooled.nrows() as f64, inputs.len() as f64, p as f64);
        let s = pf.min(k - 1.0);
        let m = ((pf - (k - 1.0)).abs() - 1.0) / 2.0;
        let nn = (n - k - pf - 1.0) / 2.0;
        let df1 = s * (2.0 * m + s + 1.0);
        let df2 = s * (2.0 * nn + s + 1.0);
        if df2 <= 0.0 {
            return Err(HyppoError::InvalidArgument(format!(
                "MANOVA needs more samples than dimensions (N={n}, p={p})"
            )));
        }
        let f = if pillai >= s {
            f64::INFINITY
        } else {
            (2.0 * nn + s + 1.0) / (2.0 * m + s + 1.0) * (pillai / (s - pillai))
        };
        Ok((pillai, f, df1, df2))
    }
}

impl KSampleTest for Manova {
    fn name(&self) -> &'static str {
        "MANOVA"
    }

    fn statistic(&self, inputs: &[Matrix]) -> Result<f64> {
        Ok(Self::compute(inputs)?.0)
    }

    fn test(&self, inputs: &[Matrix], _opts: &TestOptions) -> Result<TestOutput> {
        let (pillai, f, df1, df2) = Self::compute(inputs)?;
        let pvalue = if f.is_infinite() { 0.0 } else { f_sf(f, df1, df2)? };
        Ok(TestOutput::analytic(pillai, pvalue, PValueMethod::FTest))
    }
}
