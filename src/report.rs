//! Null distribution files and side-by-side comparison reports.

use crate::independence::IndepTestKind;
use crate::matrix::Matrix;
use crate::tools::{TestOptions, TestOutput};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAGIC: &[u8; 9] = b"HYPPONULL";
const VERSION: u32 = 1;

// ────────────────────────────────────────────────────────────────────────────
// NullDistribution – binary persistence of a permutation run
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullDistribution {
    pub test: String,
    pub stat: f64,
    pub pvalue: f64,
    pub null_dist: Vec<f64>,
}

impl NullDistribution {
    /// `None` when the p-value did not come from a permutation run.
    pub fn from_output(test: &str, output: &TestOutput) -> Option<Self> {
        let null_dist = output.null_dist.clone()?;
        Some(Self {
            test: test.to_string(),
            stat: output.stat,
            pvalue: output.pvalue,
            null_dist,
        })
    }

    /// Save to a binary file with magic bytes and versioning.
    pub fn save_to_binary<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        std::io::Write::write_all(&mut writer, MAGIC)?;
        std::io::Write::write_all(&mut writer, &VERSION.to_le_bytes())?;
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        std::io::Write::flush(&mut writer)?;
        Ok(())
    }

    /// Load from a binary file, checking magic bytes and version.
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let mut magic = [0u8; 9];
        std::io::Read::read_exact(&mut reader, &mut magic)?;
        if &magic != MAGIC {
            anyhow::bail!("Invalid magic bytes: expected 'HYPPONULL'");
        }
        let mut version_bytes = [0u8; 4];
        std::io::Read::read_exact(&mut reader, &mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != VERSION {
            anyhow::bail!("Unsupported version: {}", version);
        }
        let null: NullDistribution =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;
        Ok(null)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report – several tests on the same data
// ────────────────────────────────────────────────────────────────────────────

/// Result of one test in a [`Report`]. A test that rejects the inputs (for
/// example a univariate test on multivariate data) records its error instead
/// of aborting the whole comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Done(TestOutput),
    Failed { error: String },
}

impl Outcome {
    pub fn output(&self) -> Option<&TestOutput> {
        match self {
            Outcome::Done(out) => Some(out),
            Outcome::Failed { .. } => None,
        }
    }
}

/// Test name to outcome, in the order the tests were run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub entries: IndexMap<String, Outcome>,
}

impl Report {
    /// Run every test in `kinds` on `(x, y)`.
    pub fn compare(x: &Matrix, y: &Matrix, kinds: &[IndepTestKind], opts: &TestOptions) -> Self {
        let mut entries = IndexMap::new();
        for kind in kinds {
            let test = kind.build();
            let outcome = match test.test(x, y, opts) {
                Ok(out) => Outcome::Done(out),
                Err(e) => {
                    tracing::info!(test = test.name(), error = %e, "compare: test skipped");
                    Outcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            entries.insert(kind.to_string(), outcome);
        }
        Self { entries }
    }

    pub fn get(&self, test: &str) -> Option<&Outcome> {
        self.entries.get(test)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
