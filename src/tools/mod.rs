//! Shared machinery behind every test.
//!
//! - [`validate`] – Input checks (sample counts, NaNs, reps)
//! - [`distance`] – Pairwise distance metrics
//! - [`kernel`] – Pairwise kernel similarities
//! - [`permutation`] – Permutation null distributions and the chi-square shortcut
//! - [`blocks`] – Restricted permutations over exchangeable blocks
//! - [`sims`] – Dependence simulations for examples and power checks

pub mod blocks;
pub mod distance;
pub mod kernel;
pub mod permutation;
pub mod sims;
pub mod validate;

pub use blocks::PermutationTree;
pub use distance::{Metric, compute_dist, pairwise_distances};
pub use kernel::{Kernel, compute_kern, induced_distance, pairwise_kernels};
pub use permutation::{
    PValueMethod, TestOptions, TestOutput, chi2_approx, null_distribution, perm_pvalue, perm_test,
};
pub use sims::{Simulation, rot_ksamp, simulate};
pub use validate::{check_inputs, check_pair, check_reps, check_square};
