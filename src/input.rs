//! Reading and writing numeric tables.
//!
//! A table has one sample per line. Fields are separated by commas, whitespace
//! or both; blank lines and lines starting with `#` are skipped.

use crate::matrix::Matrix;
use crate::tools::TestOptions;
use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use std::io::Write;

/// Parse a table of floats into an `(n, p)` matrix.
pub fn parse_table(text: &str) -> Result<Matrix> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .map(|f| {
                f.parse::<f64>()
                    .with_context(|| format!("line {}: invalid number `{}`", lineno + 1, f))
            })
            .collect::<Result<Vec<f64>>>()?;
        if let Some(first) = rows.first()
            && first.len() != row.len()
        {
            bail!(
                "line {}: expected {} fields, found {}",
                lineno + 1,
                first.len(),
                row.len()
            );
        }
        rows.push(row);
    }
    if rows.is_empty() {
        bail!("table is empty");
    }
    Ok(Matrix::from_rows(&rows)?)
}

pub fn load_matrix(path: &Utf8Path) -> Result<Matrix> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
    parse_table(&text).with_context(|| format!("Failed to parse {}", path))
}

/// Write `m` as comma-separated rows.
pub fn write_table(path: &Utf8Path, m: &Matrix) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("Create {}", path))?;
    let mut writer = std::io::BufWriter::new(file);
    for row in m.rows_iter() {
        let fields: Vec<String> = row.iter().map(f64::to_string).collect();
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

/// Permutation block labels: a table of integers, one row per sample.
pub fn load_blocks(path: &Utf8Path) -> Result<Vec<Vec<i64>>> {
    let m = load_matrix(path)?;
    m.rows_iter()
        .map(|row| {
            row.iter()
                .map(|&v| {
                    if v.fract() != 0.0 {
                        bail!("{}: block label {} is not an integer", path, v);
                    }
                    Ok(v as i64)
                })
                .collect::<Result<Vec<i64>>>()
        })
        .collect()
}

/// `TestOptions` from a JSON file. Missing fields keep their defaults.
pub fn load_options(path: &Utf8Path) -> Result<TestOptions> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse options {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators() {
        let m = parse_table("# header\n1, 2 3\n\n4\t5,6\n").unwrap();
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn ragged_rows_fail() {
        assert!(parse_table("1,2\n3\n").is_err());
    }
}
