use anyhow::Result;
use hyppo::independence::{Dcorr, IndepTestKind, IndependenceTest, Pearson};
use hyppo::report::{NullDistribution, Outcome, Report};
use hyppo::tools::{Simulation, TestOptions, simulate};
use hyppo::{Matrix, TestOutput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use tempfile::NamedTempFile;

fn sample(n: usize, p: usize) -> (Matrix, Matrix) {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    simulate(Simulation::Quadratic, n, p, 0.1, &mut rng).unwrap()
}

#[test]
fn test_binary_serialization() -> Result<()> {
    let (x, y) = sample(15, 1);
    let opts = TestOptions::default().with_reps(100).with_seed(2);
    let out = Dcorr::default().test(&x, &y, &opts)?;
    let null = NullDistribution::from_output("Dcorr", &out).expect("permutation output");

    let tmp = NamedTempFile::new()?;
    null.save_to_binary(tmp.path())?;
    let loaded = NullDistribution::load_from_binary(tmp.path())?;
    assert_eq!(loaded, null);
    assert_eq!(loaded.null_dist.len(), 100);
    assert_eq!(loaded.stat, out.stat);
    Ok(())
}

#[test]
fn test_rejects_foreign_files() -> Result<()> {
    let mut tmp = NamedTempFile::new()?;
    tmp.write_all(b"NOTANULLS\x01\x00\x00\x00")?;
    let err = NullDistribution::load_from_binary(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("magic"));

    let mut tmp = NamedTempFile::new()?;
    tmp.write_all(b"HYPPONULL\x02\x00\x00\x00")?;
    let err = NullDistribution::load_from_binary(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("version"));
    Ok(())
}

#[test]
fn test_analytic_output_has_no_null() {
    let out = TestOutput::analytic(0.5, 0.1, hyppo::tools::PValueMethod::Asymptotic);
    assert!(NullDistribution::from_output("Pearson", &out).is_none());
}

#[test]
fn test_compare_report() -> Result<()> {
    let (x, y) = sample(30, 2);
    let opts = TestOptions::default().with_seed(1);
    let report = Report::compare(&x, &y, &IndepTestKind::ALL, &opts);
    assert_eq!(report.len(), IndepTestKind::ALL.len());

    let names: Vec<&str> = report.entries.keys().map(String::as_str).collect();
    assert_eq!(names, ["Dcorr", "Hsic", "Kendall", "Pearson", "Spearman"]);

    // univariate tests refuse two-column x
    assert!(report.get("Dcorr").and_then(Outcome::output).is_some());
    assert!(matches!(report.get("Pearson"), Some(Outcome::Failed { .. })));

    let json: serde_json::Value = serde_json::to_value(&report)?;
    assert!(json["Dcorr"]["pvalue"].is_number());
    assert!(json["Kendall"]["error"].is_string());
    Ok(())
}

#[test]
fn test_report_single_test_matches_direct_call() -> Result<()> {
    let (x, y) = sample(25, 1);
    let opts = TestOptions::default();
    let report = Report::compare(&x, &y, &[IndepTestKind::Pearson], &opts);
    let direct = Pearson.test(&x, &y, &opts)?;
    assert_eq!(report.get("Pearson").and_then(Outcome::output), Some(&direct));
    Ok(())
}
