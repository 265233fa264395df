//! Input validation common to all tests.

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;

/// Below this many replications the null distribution is too coarse for small
/// p-values.
pub const RECOMMENDED_REPS: usize = 1000;

/// Validate a paired `(x, y)` sample and the replication count.
pub fn check_inputs(x: &Matrix, y: &Matrix, reps: usize) -> Result<()> {
    check_pair(x, y)?;
    check_reps(reps)
}

/// Same sample count, enough samples, finite values.
pub fn check_pair(x: &Matrix, y: &Matrix) -> Result<()> {
    if x.nrows() != y.nrows() {
        return Err(HyppoError::SampleMismatch {
            x: x.nrows(),
            y: y.nrows(),
        });
    }
    check_min_samples(x.nrows())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(HyppoError::NonFinite);
    }
    Ok(())
}

pub fn check_min_samples(n: usize) -> Result<()> {
    if n <= 3 {
        return Err(HyppoError::TooFewSamples(n));
    }
    Ok(())
}

pub fn check_reps(reps: usize) -> Result<()> {
    if reps == 0 {
        return Err(HyppoError::InvalidReps);
    }
    if reps < RECOMMENDED_REPS {
        tracing::warn!(
            reps,
            "reps is below {RECOMMENDED_REPS}; p-values will be coarse"
        );
    }
    Ok(())
}

/// Precomputed distance or kernel matrices must be `(n, n)`.
pub fn check_square(m: &Matrix) -> Result<()> {
    if !m.is_square() {
        return Err(HyppoError::NotSquare {
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(())
}
