use anyhow::Result;
use camino::Utf8PathBuf;
use hyppo::Matrix;
use hyppo::input::{load_blocks, load_matrix, load_options, parse_table, write_table};
use std::io::Write;
use tempfile::NamedTempFile;

fn utf8_path(file: &NamedTempFile) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("temp path is UTF-8")
}

#[test]
fn test_parse_table() -> Result<()> {
    let m = parse_table("# x1, x2\n1.5, -2\n3e-1 4\n\n  # trailing comment\n")?;
    assert_eq!((m.nrows(), m.ncols()), (2, 2));
    assert_eq!(m.row(0), &[1.5, -2.0]);
    assert_eq!(m.row(1), &[0.3, 4.0]);
    Ok(())
}

#[test]
fn test_parse_errors() {
    let err = parse_table("1,2\n3,x\n").unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
    assert!(parse_table("1,2,3\n4,5\n").is_err());
    assert!(parse_table("# only a comment\n").is_err());
}

#[test]
fn test_write_then_load() -> Result<()> {
    let file = NamedTempFile::new()?;
    let path = utf8_path(&file);
    let m = Matrix::from_rows(&[vec![0.25, -1.0, 3.0], vec![1e-3, 2.5, 0.0]])?;
    write_table(&path, &m)?;
    let loaded = load_matrix(&path)?;
    assert_eq!(loaded, m);
    Ok(())
}

#[test]
fn test_missing_file_names_path() {
    let err = load_matrix(camino::Utf8Path::new("/nonexistent/hyppo/x.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/hyppo/x.csv"));
}

#[test]
fn test_load_blocks() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "1 -1\n1 -1\n2 3\n2 3")?;
    let blocks = load_blocks(&utf8_path(&file))?;
    assert_eq!(blocks, vec![vec![1, -1], vec![1, -1], vec![2, 3], vec![2, 3]]);

    let mut bad = NamedTempFile::new()?;
    writeln!(bad, "1.5\n2")?;
    assert!(load_blocks(&utf8_path(&bad)).is_err());
    Ok(())
}

#[test]
fn test_load_options() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, r#"{{"reps": 500, "auto": false, "workers": 2}}"#)?;
    let opts = load_options(&utf8_path(&file))?;
    assert_eq!(opts.reps, 500);
    assert!(!opts.auto);
    assert_eq!(opts.workers, Some(2));
    assert!(opts.perm_blocks.is_none());
    Ok(())
}
