//! Pairwise kernel similarities.
//!
//! The default [`Kernel::Gaussian`] picks its bandwidth from the data: the
//! median `med` of the off-diagonal L1 distances gives `gamma = 1 / (2 med^2)`.
//! A zero median (e.g. label vectors) falls back to `med = 1`.

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;
use crate::tools::distance::{Metric, pairwise_distances};
use crate::tools::validate::check_square;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type KernelFn = Arc<dyn Fn(&Matrix) -> Result<Matrix> + Send + Sync>;

#[derive(Clone, Default)]
pub enum Kernel {
    /// RBF kernel with the median-distance bandwidth.
    #[default]
    Gaussian,
    Rbf { gamma: f64 },
    /// `gamma = None` uses `1 / p`.
    Laplacian { gamma: Option<f64> },
    Linear,
    Polynomial { degree: i32, gamma: Option<f64>, coef0: f64 },
    Sigmoid { gamma: Option<f64>, coef0: f64 },
    Cosine,
    /// Inputs already are kernel matrices.
    Precomputed,
    Custom(KernelFn),
}

impl Kernel {
    pub fn custom(f: impl Fn(&Matrix) -> Result<Matrix> + Send + Sync + 'static) -> Self {
        Kernel::Custom(Arc::new(f))
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, Kernel::Precomputed)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Gaussian => f.write_str("Gaussian"),
            Kernel::Rbf { gamma } => write!(f, "Rbf {{ gamma: {gamma} }}"),
            Kernel::Laplacian { gamma } => write!(f, "Laplacian {{ gamma: {gamma:?} }}"),
            Kernel::Linear => f.write_str("Linear"),
            Kernel::Polynomial {
                degree,
                gamma,
                coef0,
            } => write!(
                f,
                "Polynomial {{ degree: {degree}, gamma: {gamma:?}, coef0: {coef0} }}"
            ),
            Kernel::Sigmoid { gamma, coef0 } => {
                write!(f, "Sigmoid {{ gamma: {gamma:?}, coef0: {coef0} }}")
            }
            Kernel::Cosine => f.write_str("Cosine"),
            Kernel::Precomputed => f.write_str("Precomputed"),
            Kernel::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FromStr for Kernel {
    type Err = HyppoError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" | "rbf" => Kernel::Gaussian,
            "laplacian" => Kernel::Laplacian { gamma: None },
            "linear" => Kernel::Linear,
            "poly" | "polynomial" => Kernel::Polynomial {
                degree: 3,
                gamma: None,
                coef0: 1.0,
            },
            "sigmoid" => Kernel::Sigmoid {
                gamma: None,
                coef0: 1.0,
            },
            "cosine" => Kernel::Cosine,
            "precomputed" | "none" => Kernel::Precomputed,
            other => return Err(HyppoError::UnknownKernel(other.to_string())),
        })
    }
}

/// Median of the strictly off-diagonal entries of a square matrix.
fn offdiag_median(d: &Matrix) -> f64 {
    let n = d.nrows();
    let mut vals: Vec<f64> = (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .map(|ij| d[ij])
        .collect();
    if vals.is_empty() {
        return 0.0;
    }
    vals.sort_by(f64::total_cmp);
    let mid = vals.len() / 2;
    if vals.len() % 2 == 0 {
        (vals[mid - 1] + vals[mid]) / 2.0
    } else {
        vals[mid]
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(u, v)| u * v).sum()
}

fn pairwise_with(x: &Matrix, f: impl Fn(&[f64], &[f64]) -> f64 + Sync) -> Result<Matrix> {
    let n = x.nrows();
    let f = &f;
    let data: Vec<f64> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| (0..n).map(move |j| f(x.row(i), x.row(j))))
        .collect();
    Matrix::new(n, n, data)
}

/// Kernel similarities among the rows of `x`.
pub fn pairwise_kernels(x: &Matrix, kernel: &Kernel) -> Result<Matrix> {
    let inv_p = 1.0 / x.ncols().max(1) as f64;
    match kernel {
        Kernel::Precomputed => {
            check_square(x)?;
            Ok(x.clone())
        }
        Kernel::Custom(f) => {
            let k = f(x)?;
            if k.nrows() != x.nrows() || !k.is_square() {
                return Err(HyppoError::NotSquare {
                    rows: k.nrows(),
                    cols: k.ncols(),
                });
            }
            Ok(k)
        }
        Kernel::Gaussian => {
            let l1 = pairwise_distances(x, &Metric::Cityblock)?;
            let med = match offdiag_median(&l1) {
                m if m == 0.0 => 1.0,
                m => m,
            };
            let gamma = 1.0 / (2.0 * med * med);
            tracing::debug!(med, gamma, "gaussian kernel bandwidth");
            rbf(x, gamma)
        }
        Kernel::Rbf { gamma } => rbf(x, *gamma),
        Kernel::Laplacian { gamma } => {
            let g = gamma.unwrap_or(inv_p);
            let l1 = pairwise_distances(x, &Metric::Cityblock)?;
            Ok(l1.map(|d| (-g * d).exp()))
        }
        Kernel::Linear => pairwise_with(x, dot),
        Kernel::Polynomial {
            degree,
            gamma,
            coef0,
        } => {
            let g = gamma.unwrap_or(inv_p);
            pairwise_with(x, |a, b| (g * dot(a, b) + coef0).powi(*degree))
        }
        Kernel::Sigmoid { gamma, coef0 } => {
            let g = gamma.unwrap_or(inv_p);
            pairwise_with(x, |a, b| (g * dot(a, b) + coef0).tanh())
        }
        Kernel::Cosine => pairwise_with(x, |a, b| {
            let norm = dot(a, a).sqrt() * dot(b, b).sqrt();
            if norm == 0.0 { 0.0 } else { dot(a, b) / norm }
        }),
    }
}

fn rbf(x: &Matrix, gamma: f64) -> Result<Matrix> {
    let sq = pairwise_distances(x, &Metric::SqEuclidean)?;
    Ok(sq.map(|d| (-gamma * d).exp()))
}

/// Kernel matrices for both inputs.
pub fn compute_kern(x: &Matrix, y: &Matrix, kernel: &Kernel) -> Result<(Matrix, Matrix)> {
    Ok((pairwise_kernels(x, kernel)?, pairwise_kernels(y, kernel)?))
}

/// Distance induced by a kernel matrix: `1 - K / max(K)`.
pub fn induced_distance(k: &Matrix) -> Matrix {
    let max = match k.max() {
        m if m > 0.0 && m.is_finite() => m,
        _ => 1.0,
    };
    k.map(|v| 1.0 - v / max)
}
