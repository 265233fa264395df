//! Pairwise distance metrics.

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;
use crate::tools::validate::check_square;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied function mapping an `(n, p)` data matrix to an `(n, n)`
/// distance matrix.
pub type DistanceFn = Arc<dyn Fn(&Matrix) -> Result<Matrix> + Send + Sync>;

#[derive(Clone, Default)]
pub enum Metric {
    #[default]
    Euclidean,
    Cityblock,
    Chebyshev,
    SqEuclidean,
    Minkowski(f64),
    Cosine,
    /// Inputs already are distance matrices.
    Precomputed,
    Custom(DistanceFn),
}

impl Metric {
    pub fn custom(f: impl Fn(&Matrix) -> Result<Matrix> + Send + Sync + 'static) -> Self {
        Metric::Custom(Arc::new(f))
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, Metric::Precomputed)
    }

    pub fn is_euclidean(&self) -> bool {
        matches!(self, Metric::Euclidean)
    }

    fn between(&self, a: &[f64], b: &[f64]) -> f64 {
        let pairs = a.iter().zip(b);
        match self {
            Metric::Euclidean => pairs.map(|(u, v)| (u - v).powi(2)).sum::<f64>().sqrt(),
            Metric::SqEuclidean => pairs.map(|(u, v)| (u - v).powi(2)).sum(),
            Metric::Cityblock => pairs.map(|(u, v)| (u - v).abs()).sum(),
            Metric::Chebyshev => pairs.map(|(u, v)| (u - v).abs()).fold(0.0, f64::max),
            Metric::Minkowski(p) => pairs
                .map(|(u, v)| (u - v).abs().powf(*p))
                .sum::<f64>()
                .powf(1.0 / p),
            Metric::Cosine => {
                let (mut dot, mut na, mut nb) = (0.0, 0.0, 0.0);
                for (u, v) in pairs {
                    dot += u * v;
                    na += u * u;
                    nb += v * v;
                }
                if na == 0.0 || nb == 0.0 {
                    // zero vectors have no direction
                    if na == nb { 0.0 } else { 1.0 }
                } else {
                    1.0 - dot / (na.sqrt() * nb.sqrt())
                }
            }
            Metric::Precomputed | Metric::Custom(_) => 0.0,
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Euclidean => f.write_str("Euclidean"),
            Metric::Cityblock => f.write_str("Cityblock"),
            Metric::Chebyshev => f.write_str("Chebyshev"),
            Metric::SqEuclidean => f.write_str("SqEuclidean"),
            Metric::Minkowski(p) => write!(f, "Minkowski({p})"),
            Metric::Cosine => f.write_str("Cosine"),
            Metric::Precomputed => f.write_str("Precomputed"),
            Metric::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FromStr for Metric {
    type Err = HyppoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Ok(match s.as_str() {
            "euclidean" | "l2" => Metric::Euclidean,
            "cityblock" | "manhattan" | "l1" => Metric::Cityblock,
            "chebyshev" => Metric::Chebyshev,
            "sqeuclidean" => Metric::SqEuclidean,
            "cosine" => Metric::Cosine,
            "precomputed" | "none" => Metric::Precomputed,
            other => match other.strip_prefix("minkowski") {
                // "minkowski" or "minkowski:3"
                Some("") => Metric::Minkowski(2.0),
                Some(rest) => {
                    let p = rest
                        .trim_start_matches(':')
                        .parse::<f64>()
                        .map_err(|_| HyppoError::UnknownMetric(s.clone()))?;
                    Metric::Minkowski(p)
                }
                None => return Err(HyppoError::UnknownMetric(s.clone())),
            },
        })
    }
}

/// Pairwise distances among the rows of `x`.
pub fn pairwise_distances(x: &Matrix, metric: &Metric) -> Result<Matrix> {
    match metric {
        Metric::Precomputed => {
            check_square(x)?;
            Ok(x.clone())
        }
        Metric::Custom(f) => {
            let d = f(x)?;
            if d.nrows() != x.nrows() || !d.is_square() {
                return Err(HyppoError::NotSquare {
                    rows: d.nrows(),
                    cols: d.ncols(),
                });
            }
            Ok(d)
        }
        _ => {
            let n = x.nrows();
            let data: Vec<f64> = (0..n)
                .into_par_iter()
                .flat_map_iter(|i| {
                    let a = x.row(i);
                    (0..n).map(move |j| if i == j { 0.0 } else { metric.between(a, x.row(j)) })
                })
                .collect();
            Matrix::new(n, n, data)
        }
    }
}

/// Distance matrices for both inputs.
pub fn compute_dist(x: &Matrix, y: &Matrix, metric: &Metric) -> Result<(Matrix, Matrix)> {
    Ok((pairwise_distances(x, metric)?, pairwise_distances(y, metric)?))
}
