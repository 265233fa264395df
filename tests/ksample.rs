use hyppo::independence::IndepTestKind;
use hyppo::ksample::{
    Disco, Energy, Hotelling, KSample, KSampleKind, KSampleTest, Manova, Mmd, k_sample_transform,
};
use hyppo::tools::{Kernel, PValueMethod, Simulation, TestOptions, rot_ksamp, simulate};
use hyppo::{HyppoError, Matrix};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Two Gaussian clouds, the second shifted by `shift` in every dimension.
fn shifted_groups(n: usize, p: usize, shift: f64, seed: u64) -> Vec<Matrix> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (a, _) = simulate(Simulation::Independence, n, p, 0.0, &mut rng).unwrap();
    let (b, _) = simulate(Simulation::Independence, n, p, 0.0, &mut rng).unwrap();
    vec![a, b.map(|v| v + shift)]
}

fn opts() -> TestOptions {
    TestOptions::default().with_reps(200).with_seed(17)
}

#[test]
fn test_transform_two_groups() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(&[vec![5.0, 6.0], vec![7.0, 8.0], vec![9.0, 0.0]]).unwrap();
    let (u, v) = k_sample_transform(&[a, b]).unwrap();
    assert_eq!((u.nrows(), u.ncols()), (5, 2));
    assert_eq!(v.as_slice(), &[0.0, 0.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_transform_one_hot() {
    let groups: Vec<Matrix> = (0..3)
        .map(|g| Matrix::column(&[g as f64, g as f64 + 0.5]))
        .collect();
    let (u, v) = k_sample_transform(&groups).unwrap();
    assert_eq!(u.nrows(), 6);
    assert_eq!((v.nrows(), v.ncols()), (6, 3));
    assert_eq!(v.row(0), &[1.0, 0.0, 0.0]);
    assert_eq!(v.row(3), &[0.0, 1.0, 0.0]);
    assert_eq!(v.row(5), &[0.0, 0.0, 1.0]);
}

#[test]
fn test_transform_errors() {
    let a = Matrix::column(&[1.0, 2.0, 3.0]);
    assert!(matches!(
        k_sample_transform(std::slice::from_ref(&a)),
        Err(HyppoError::TooFewGroups(1))
    ));
    let c = Matrix::column(&[4.0; 3]);
    assert!(matches!(
        k_sample_transform(&[c.clone(), c]),
        Err(HyppoError::ZeroVariance)
    ));
    let wide = Matrix::zeros(3, 2);
    assert!(matches!(
        KSample::from_kind(IndepTestKind::Dcorr).test(&[a, wide], &opts()),
        Err(HyppoError::DimensionMismatch {
            expected: 1,
            got: 2
        })
    ));
}

#[test]
fn test_ksample_dcorr_detects_shift() {
    let groups = shifted_groups(40, 2, 3.0, 1);
    let out = KSample::from_kind(IndepTestKind::Dcorr)
        .test(&groups, &opts())
        .unwrap();
    assert!(out.stat > 0.3);
    assert!(out.pvalue < 0.01);
}

#[test]
fn test_ksample_rotated_three_groups() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let groups = rot_ksamp(
        Simulation::Linear,
        100,
        1,
        3,
        &[60.0, -60.0],
        0.0,
        &mut rng,
    )
    .unwrap();
    let test = KSample::from_kind(IndepTestKind::Dcorr);
    let out = test.test(&groups, &opts()).unwrap();
    assert_eq!(test.inner().name(), "Dcorr");
    assert!(out.pvalue < 0.01);
}

#[test]
fn test_energy_known_value() {
    let x = Matrix::column(&[0.0, 0.0]);
    let y = Matrix::column(&[1.0, 1.0]);
    let stat = Energy::default().statistic(&[x, y]).unwrap();
    assert!((stat - 2.0).abs() < 1e-12);
}

#[test]
fn test_energy_and_mmd_detect_shift() {
    let groups = shifted_groups(30, 3, 2.5, 2);
    let energy = Energy::default().test(&groups, &opts()).unwrap();
    assert_eq!(energy.method, PValueMethod::Permutation);
    assert_eq!(energy.pvalue, 1.0 / 200.0);
    let mmd = Mmd::default().test(&groups, &opts()).unwrap();
    assert!(mmd.stat > 0.0);
    assert_eq!(mmd.pvalue, 1.0 / 200.0);
}

#[test]
fn test_mmd_identical_groups() {
    let x = Matrix::column(&[1.0, 2.0]);
    let stat = Mmd::new(Kernel::Linear)
        .statistic(&[x.clone(), x])
        .unwrap();
    assert!(stat.abs() < 1e-12);
}

#[test]
fn test_two_group_tests_reject_three() {
    let groups = shifted_groups(5, 1, 1.0, 4);
    let three = vec![groups[0].clone(), groups[1].clone(), groups[0].clone()];
    for test in [
        Box::new(Energy::default()) as Box<dyn KSampleTest>,
        Box::new(Mmd::default()),
        Box::new(Hotelling),
    ] {
        assert!(matches!(
            test.statistic(&three),
            Err(HyppoError::TwoGroupsOnly { got: 3, .. })
        ));
    }
}

#[test]
fn test_disco_three_groups() {
    let mut groups = shifted_groups(20, 2, 4.0, 5);
    groups.push(groups[0].map(|v| v - 4.0));
    let out = Disco::default().test(&groups, &opts()).unwrap();
    assert!(out.stat > 1.0);
    assert_eq!(out.pvalue, 1.0 / 200.0);
}

#[test]
fn test_disco_constant_groups() {
    let groups = vec![Matrix::filled(5, 2, 0.0), Matrix::filled(5, 2, 3.0)];
    assert!(matches!(
        Disco::default().statistic(&groups),
        Err(HyppoError::ZeroVariance)
    ));
    assert!(matches!(
        Disco::default().test(&groups, &opts()),
        Err(HyppoError::ZeroVariance)
    ));
}

#[test]
fn test_disco_output_serializes_as_numbers() {
    // relabeling into {0, 0, 0} and {1, 1, 1} leaves no within-group spread
    let groups = vec![
        Matrix::column(&[0.0, 0.0, 1.0]),
        Matrix::column(&[1.0, 1.0, 0.0]),
    ];
    let out = Disco::default().test(&groups, &opts()).unwrap();
    assert!(out.stat.is_finite());
    let null = out.null_dist.as_ref().unwrap();
    assert!(null.iter().all(|v| v.is_finite()));
    assert!(null.contains(&f64::MAX));

    let json = serde_json::to_value(&out).unwrap();
    assert!(json["stat"].is_number());
    assert!(json["null_dist"].as_array().unwrap().iter().all(|v| v.is_number()));
}

#[test]
fn test_hotelling_matches_t_test() {
    let x = Matrix::column(&[1.0, 2.0, 3.0]);
    let y = Matrix::column(&[4.0, 5.0, 6.0]);
    let out = Hotelling.test(&[x, y], &TestOptions::default()).unwrap();
    assert!((out.stat - 13.5).abs() < 1e-9);
    assert!((out.pvalue - 0.021312).abs() < 1e-4);
    assert_eq!(out.method, PValueMethod::FTest);
    assert!(out.null_dist.is_none());
}

#[test]
fn test_hotelling_two_dimensions() {
    let x = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 4.0], vec![4.0, 3.0]])
        .unwrap();
    let y = Matrix::from_rows(&[vec![3.0, 3.0], vec![5.0, 4.0], vec![4.0, 6.0], vec![6.0, 5.0]])
        .unwrap();
    let out = Hotelling.test(&[x, y], &TestOptions::default()).unwrap();
    // pooled covariance [[5/3, 5/6], [5/6, 5/3]], mean difference (-2, -2)
    assert!((out.stat - 6.4).abs() < 1e-9);
    // F(2, 5) survival at 8/3
    assert!((out.pvalue - 0.1628636).abs() < 1e-6);
}

#[test]
fn test_hotelling_singular() {
    let x = Matrix::from_rows(&[vec![1.0, 0.0], vec![2.0, 0.0], vec![3.0, 0.0]]).unwrap();
    let y = Matrix::from_rows(&[vec![4.0, 0.0], vec![5.0, 0.0], vec![6.0, 0.0]]).unwrap();
    assert!(matches!(
        Hotelling.test(&[x, y], &TestOptions::default()),
        Err(HyppoError::Singular)
    ));
}

#[test]
fn test_manova_matches_anova() {
    let x = Matrix::column(&[1.0, 2.0, 3.0]);
    let y = Matrix::column(&[4.0, 5.0, 6.0]);
    let out = Manova.test(&[x, y], &TestOptions::default()).unwrap();
    assert!((out.stat - 13.5 / 17.5).abs() < 1e-9);
    assert!((out.pvalue - 0.021312).abs() < 1e-4);
}

#[test]
fn test_manova_detects_shift() {
    let mut groups = shifted_groups(25, 2, 2.0, 6);
    groups.push(groups[0].map(|v| v + 4.0));
    let out = Manova.test(&groups, &TestOptions::default()).unwrap();
    assert!(out.stat > 0.0 && out.stat < 2.0);
    assert!(out.pvalue < 1e-3);
}

#[test]
fn test_kind_names() {
    assert_eq!(
        "ksample:dcorr".parse::<KSampleKind>().unwrap(),
        KSampleKind::Indep(IndepTestKind::Dcorr)
    );
    assert_eq!("HSIC".parse::<KSampleKind>().unwrap(), KSampleKind::Indep(IndepTestKind::Hsic));
    assert_eq!("Energy".parse::<KSampleKind>().unwrap(), KSampleKind::Energy);
    assert!(matches!(
        "bogus".parse::<KSampleKind>(),
        Err(HyppoError::UnknownTest(_))
    ));
    assert_eq!(KSampleKind::Manova.build().name(), "MANOVA");
}
