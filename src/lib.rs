//! Multivariate hypothesis testing.
//!
//! `hyppo` collects independence and k-sample tests behind two small traits.
//! Every test accepts `(n, p)` sample matrices, so relationships between
//! random *vectors* can be tested, not only between scalars.
//!
//! - [`independence`] – Dcorr, Hsic, Kendall, Pearson, Spearman, MaxMargin
//! - [`ksample`] – KSample (reduction to independence), Energy, DISCO, MMD,
//!   Hotelling, MANOVA
//! - [`tools`] – Validation, distances, kernels, the permutation engine and
//!   simulations
//! - [`input`] / [`report`] – Numeric tables, JSON reports and persisted null
//!   distributions
//!
//! # Usage
//!
//! ```no_run
//! use hyppo::independence::{Dcorr, IndependenceTest};
//! use hyppo::tools::{Simulation, TestOptions, simulate};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! let (x, y) = simulate(Simulation::Linear, 100, 1, 0.0, &mut rng)?;
//! let out = Dcorr::default().test(&x, &y, &TestOptions::default().with_seed(1))?;
//! println!("stat={} pvalue={}", out.stat, out.pvalue);
//! # Ok::<(), hyppo::HyppoError>(())
//! ```
//!
//! The `hyppo` binary wraps the same tests for tables on disk; see
//! `hyppo --help`. A k-sample walkthrough lives in `demos/ksample.rs`
//! (`cargo run --example ksample`).

pub mod error;
pub mod independence;
pub mod input;
pub mod ksample;
pub mod matrix;
pub mod report;
pub mod tools;

pub use error::{HyppoError, Result};
pub use independence::{IndepTestKind, IndependenceTest};
pub use ksample::{KSampleKind, KSampleTest};
pub use matrix::Matrix;
pub use report::{NullDistribution, Report};
pub use tools::{TestOptions, TestOutput};
