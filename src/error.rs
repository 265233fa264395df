//! Error type shared by every test in the crate.

use thiserror::Error;

/// Errors raised while validating inputs or computing a test.
#[derive(Debug, Error)]
pub enum HyppoError {
    #[error("matrix shape {rows}x{cols} does not match {len} values")]
    Shape { rows: usize, cols: usize, len: usize },

    #[error("x has {x} samples but y has {y}; the number of samples must match")]
    SampleMismatch { x: usize, y: usize },

    #[error("number of samples is too low ({0}); at least 4 are required")]
    TooFewSamples(usize),

    #[error("inputs contain NaN or infinite values")]
    NonFinite,

    #[error("reps must be a positive integer")]
    InvalidReps,

    #[error("{test} requires one-dimensional inputs, got {cols} columns")]
    NotOneDimensional { test: &'static str, cols: usize },

    #[error("precomputed matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("unknown test `{0}`")]
    UnknownTest(String),

    #[error("unknown metric `{0}`")]
    UnknownMetric(String),

    #[error("unknown kernel `{0}`")]
    UnknownKernel(String),

    #[error("unknown simulation `{0}`")]
    UnknownSimulation(String),

    #[error("test cannot be run, the inputs have 0 variance")]
    ZeroVariance,

    #[error("at least 2 sample groups are required, got {0}")]
    TooFewGroups(usize),

    #[error("{test} supports exactly 2 sample groups, got {got}")]
    TwoGroupsOnly { test: &'static str, got: usize },

    #[error("all groups must have the same number of dimensions ({expected} vs {got})")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("covariance matrix is singular")]
    Singular,

    #[error("invalid permutation blocks: {0}")]
    PermBlocks(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("distribution error: {0}")]
    Distribution(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, HyppoError>;
