//! K-sample tests.
//!
//! Given `k` groups with distributions `F_1, ..., F_k`, test
//!
//! ```text
//! H0: F_1 = F_2 = ... = F_k        HA: F_i != F_j for some i != j
//! ```
//!
//! [`KSample`] reduces the problem to independence testing: the groups are
//! stacked into `u` and a label matrix `v` records group membership, then any
//! [`IndependenceTest`] runs on `(u, v)`. [`Energy`], [`Disco`] and [`Mmd`] are
//! the classical distance and kernel statistics with permutation p-values;
//! [`Hotelling`] and [`Manova`] are the parametric baselines.

pub mod energy;
pub mod hotelling;
pub mod mmd;

pub use energy::{Disco, Energy};
pub use hotelling::{Hotelling, Manova};
pub use mmd::Mmd;

use crate::error::{HyppoError, Result};
use crate::independence::{IndepTestKind, IndependenceTest};
use crate::matrix::Matrix;
use crate::tools::{TestOptions, TestOutput};
use std::str::FromStr;

/// Common interface of every k-sample test.
pub trait KSampleTest: Send + Sync {
    fn name(&self) -> &'static str;

    /// Test statistic of the groups.
    fn statistic(&self, inputs: &[Matrix]) -> Result<f64>;

    /// Test statistic and p-value of the groups.
    fn test(&self, inputs: &[Matrix], opts: &TestOptions) -> Result<TestOutput>;
}

/// Validate a list of sample groups: at least two, equal dimensions, at least
/// two samples each, finite values.
pub fn check_groups(inputs: &[Matrix]) -> Result<()> {
    if inputs.len() < 2 {
        return Err(HyppoError::TooFewGroups(inputs.len()));
    }
    let dims = inputs[0].ncols();
    for m in inputs {
        if m.ncols() != dims {
            return Err(HyppoError::DimensionMismatch {
                expected: dims,
                got: m.ncols(),
            });
        }
        if m.nrows() < 2 {
            return Err(HyppoError::TooFewSamples(m.nrows()));
        }
        if !m.is_finite() {
            return Err(HyppoError::NonFinite);
        }
    }
    Ok(())
}

pub(crate) fn require_two(test: &'static str, inputs: &[Matrix]) -> Result<()> {
    if inputs.len() != 2 {
        return Err(HyppoError::TwoGroupsOnly {
            test,
            got: inputs.len(),
        });
    }
    Ok(())
}

pub(crate) fn group_sizes(inputs: &[Matrix]) -> Vec<usize> {
    inputs.iter().map(Matrix::nrows).collect()
}

/// Stack the groups into `u` and build the label matrix `v`.
///
/// Two groups get a single 0/1 column; more groups get a one-hot encoding
/// with one column per group.
pub fn k_sample_transform(inputs: &[Matrix]) -> Result<(Matrix, Matrix)> {
    if inputs.len() < 2 {
        return Err(HyppoError::TooFewGroups(inputs.len()));
    }
    let u = Matrix::vstack(inputs)?;
    if u.variance() == 0.0 {
        return Err(HyppoError::ZeroVariance);
    }
    let k = inputs.len();
    let labels: Vec<usize> = inputs
        .iter()
        .enumerate()
        .flat_map(|(g, m)| std::iter::repeat_n(g, m.nrows()))
        .collect();
    let v = if k == 2 {
        Matrix::from_fn(labels.len(), 1, |i, _| labels[i] as f64)
    } else {
        Matrix::from_fn(labels.len(), k, |i, j| f64::from(u8::from(labels[i] == j)))
    };
    Ok((u, v))
}

/// K-sample testing through an independence test.
pub struct KSample {
    inner: Box<dyn IndependenceTest>,
}

impl KSample {
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

impl KSampleTest for KSample {
    fn name(&self) -> &'static str {
        "KSample"
    }

    fn statistic(&self, inputs: &[Matrix]) -> Result<f64> {
        check_groups(inputs)?;
        let (u, v) = k_sample_transform(inputs)?;
        self.inner.statistic(&u, &v)
    }

    fn test(&self, inputs: &[Matrix], opts: &TestOptions) -> Result<TestOutput> {
        check_groups(inputs)?;
        let (u, v) = k_sample_transform(inputs)?;
        tracing::debug!(
            inner = self.inner.name(),
            groups = inputs.len(),
            n = u.nrows(),
            "ksample: independence reduction"
        );
        self.inner.test(&u, &v, opts)
    }
}

/// K-sample tests selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KSampleKind {
    Energy,
    Disco,
    Mmd,
    Hotelling,
    Manova,
    /// Reduction to the named independence test.
    Indep(IndepTestKind),
}

impl KSampleKind {
    /// The test with its default settings.
    pub fn build(self) -> Box<dyn KSampleTest> {
        match self {
            KSampleKind::Energy => Box::new(Energy::default()),
            KSampleKind::Disco => Box::new(Disco::default()),
            KSampleKind::Mmd => Box::new(Mmd::default()),
            KSampleKind::Hotelling => Box::new(Hotelling),
            KSampleKind::Manova => Box::new(Manova),
            KSampleKind::Indep(kind) => Box::new(KSample::from_kind(kind)),
        }
    }
}

impl FromStr for KSampleKind {
    type Err = HyppoError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "energy" => KSampleKind::Energy,
            "disco" => KSampleKind::Disco,
            "mmd" => KSampleKind::Mmd,
            "hotelling" => KSampleKind::Hotelling,
            "manova" => KSampleKind::Manova,
            other => {
                // "ksample:dcorr" or a bare independence test name
                let name = other.strip_prefix("ksample:").unwrap_or(other);
                KSampleKind::Indep(name.parse()?)
            }
        })
    }
}
