//! Independence tests.
//!
//! Given paired samples `x` of shape `(n, p)` and `y` of shape `(n, q)`, each
//! test asks whether the underlying random vectors are independent:
//!
//! ```text
//! H0: F_XY = F_X F_Y        HA: F_XY != F_X F_Y
//! ```
//!
//! Every test implements [`IndependenceTest`]: `statistic` computes the test
//! statistic alone, `test` returns the statistic with its p-value.
//!
//! - [`Dcorr`] – Distance correlation
//! - [`Hsic`] – Hilbert-Schmidt independence criterion
//! - [`Kendall`] – Kendall's tau-b (univariate)
//! - [`Pearson`], [`Spearman`] – Product-moment and rank correlation (univariate)
//! - [`MaxMargin`] – Maximum of a univariate test over all dimension pairs

pub mod dcorr;
pub mod fast_dcov;
pub mod hsic;
pub mod kendall;
pub mod maxmargin;
pub mod pearson;

pub use dcorr::Dcorr;
pub use hsic::Hsic;
pub use kendall::Kendall;
pub use maxmargin::MaxMargin;
pub use pearson::{Pearson, Spearman};

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;
use crate::tools::{TestOptions, TestOutput};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common interface of every independence test.
pub trait IndependenceTest: Send + Sync {
    fn name(&self) -> &'static str;

    /// Test statistic of `(x, y)`.
    fn statistic(&self, x: &Matrix, y: &Matrix) -> Result<f64>;

    /// Test statistic and p-value of `(x, y)`.
    fn test(&self, x: &Matrix, y: &Matrix, opts: &TestOptions) -> Result<TestOutput>;
}

/// Independence tests selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndepTestKind {
    Dcorr,
    Hsic,
    Kendall,
    Pearson,
    Spearman,
}

impl IndepTestKind {
    pub const ALL: [IndepTestKind; 5] = [
        IndepTestKind::Dcorr,
        IndepTestKind::Hsic,
        IndepTestKind::Kendall,
        IndepTestKind::Pearson,
        IndepTestKind::Spearman,
    ];

    /// The test with its default settings.
    pub fn build(self) -> Box<dyn IndependenceTest> {
        match self {
            IndepTestKind::Dcorr => Box::new(Dcorr::default()),
            IndepTestKind::Hsic => Box::new(Hsic::default()),
            IndepTestKind::Kendall => Box::new(Kendall),
            IndepTestKind::Pearson => Box::new(Pearson),
            IndepTestKind::Spearman => Box::new(Spearman),
        }
    }
}

impl fmt::Display for IndepTestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndepTestKind::Dcorr => "Dcorr",
            IndepTestKind::Hsic => "Hsic",
            IndepTestKind::Kendall => "Kendall",
            IndepTestKind::Pearson => "Pearson",
            IndepTestKind::Spearman => "Spearman",
        };
        f.write_str(name)
    }
}

impl FromStr for IndepTestKind {
    type Err = HyppoError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "dcorr" => IndepTestKind::Dcorr,
            "hsic" => IndepTestKind::Hsic,
            "kendall" => IndepTestKind::Kendall,
            "pearson" => IndepTestKind::Pearson,
            "spearman" => IndepTestKind::Spearman,
            other => return Err(HyppoError::UnknownTest(other.to_string())),
        })
    }
}

/// Fail unless `m` has a single column.
pub(crate) fn require_1d(test: &'static str, m: &Matrix) -> Result<()> {
    if m.ncols() != 1 {
        return Err(HyppoError::NotOneDimensional {
            test,
            cols: m.ncols(),
        });
    }
    Ok(())
}
