use hyppo::independence::{Dcorr, IndependenceTest};
use hyppo::tools::{
    PValueMethod, PermutationTree, TestOptions, chi2_approx, null_distribution, perm_test,
};
use hyppo::{HyppoError, Matrix};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn ramp(n: usize) -> Matrix {
    Matrix::from_fn(n, 1, |i, _| (i as f64 * 0.7).sin() + i as f64 * 0.1)
}

#[test]
fn test_blocks_force_permutation() {
    let x = ramp(40);
    let blocks: Vec<Vec<i64>> = (0..40).map(|i| vec![i / 4]).collect();
    let opts = TestOptions::default()
        .with_reps(100)
        .with_seed(1)
        .with_perm_blocks(blocks);
    let out = Dcorr::default().test(&x, &x, &opts).unwrap();
    assert_eq!(out.method, PValueMethod::Permutation);
    assert_eq!(out.null_dist.map(|d| d.len()), Some(100));
}

#[test]
fn test_blocks_length_mismatch() {
    let x = ramp(10);
    let blocks: Vec<Vec<i64>> = (0..8).map(|i| vec![i]).collect();
    let opts = TestOptions::default().with_perm_blocks(blocks);
    assert!(matches!(
        Dcorr::default().test(&x, &x, &opts),
        Err(HyppoError::PermBlocks(_))
    ));
}

#[test]
fn test_ragged_blocks() {
    let blocks: Vec<Vec<i64>> = vec![vec![1, 2], vec![1]];
    assert!(matches!(
        PermutationTree::new(&blocks),
        Err(HyppoError::PermBlocks(_))
    ));
    assert!(matches!(
        PermutationTree::new(&[]),
        Err(HyppoError::PermBlocks(_))
    ));
}

#[test]
fn test_nested_blocks_keep_members_together() {
    // two top-level groups, each split into two sub-blocks
    let blocks: Vec<Vec<i64>> = (0..8).map(|i| vec![i / 4, i / 2]).collect();
    let tree = PermutationTree::new(&blocks).unwrap();
    assert_eq!(tree.len(), 8);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..50 {
        let p = tree.permute(&mut rng);
        for pair in p.chunks(2) {
            assert_eq!(pair[0] / 2, pair[1] / 2, "sub-block split: {p:?}");
        }
        for half in p.chunks(4) {
            assert!(half.iter().all(|s| s / 4 == half[0] / 4), "group split: {p:?}");
        }
    }
}

#[test]
fn test_pinned_rows_never_move() {
    let blocks: Vec<Vec<i64>> = vec![vec![-1], vec![-1], vec![1], vec![1], vec![2], vec![2]];
    let opts = TestOptions::default()
        .with_reps(64)
        .with_seed(5)
        .with_perm_blocks(blocks);
    let null = null_distribution(6, &opts, |p| Ok(f64::from(u8::from(p[..2] == [0, 1])))).unwrap();
    assert!(null.iter().all(|&v| v == 1.0));
}

#[test]
fn test_blocks_from_matrix() {
    let m = Matrix::from_rows(&[vec![0.0], vec![0.0], vec![1.0], vec![1.0]]).unwrap();
    assert_eq!(PermutationTree::from_matrix(&m).unwrap().len(), 4);
    let bad = Matrix::column(&[0.5, 1.0]);
    assert!(PermutationTree::from_matrix(&bad).is_err());
}

#[test]
fn test_seeds_change_the_null() {
    let stat = |p: &[usize]| {
        Ok::<f64, HyppoError>(p.iter().enumerate().map(|(i, &v)| (i * v) as f64).sum())
    };
    let a = null_distribution(10, &TestOptions::default().with_reps(20).with_seed(1), stat).unwrap();
    let b = null_distribution(10, &TestOptions::default().with_reps(20).with_seed(1), stat).unwrap();
    let c = null_distribution(10, &TestOptions::default().with_reps(20).with_seed(2), stat).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_perm_test_on_raw_rows() {
    let x = ramp(12);
    let opts = TestOptions::default().with_reps(100).with_seed(3);
    let out = perm_test(
        |a: &Matrix, b: &Matrix| {
            Ok(a.as_slice()
                .iter()
                .zip(b.as_slice())
                .map(|(u, v)| u * v)
                .sum::<f64>())
        },
        &x,
        &x,
        &opts,
        false,
    )
    .unwrap();
    assert_eq!(out.pvalue, 1.0 / 100.0);
}

#[test]
fn test_chi2_approx_formula() {
    let x = ramp(30);
    let out = chi2_approx(|_: &Matrix, _: &Matrix| Ok(0.0), &x, &x).unwrap();
    // P(chi2_1 > 1)
    assert!((out.pvalue - 0.3173105).abs() < 1e-6);
    assert_eq!(out.method, PValueMethod::Chi2);
}

#[test]
fn test_options_from_json() {
    let opts: TestOptions = serde_json::from_str(r#"{"reps": 250, "seed": 4}"#).unwrap();
    assert_eq!(opts.reps, 250);
    assert_eq!(opts.seed, Some(4));
    assert!(opts.auto);
    assert!(opts.workers.is_none());
}
