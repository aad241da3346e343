//! Integration tests exercising the full pipeline across module boundaries:
//! complement coding → parallel scoring → ranking → vigilance walk.

use approx::assert_abs_diff_eq;
use art_core::kernel::{self, Capabilities};
use art_core::{
    ArtConfig, EngineConfig, FuzzyArt, Outcome, SchedulerConfig, VectorKernel, complement_code,
};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

fn config(m: usize, model: ArtConfig, workers: usize, batch_size: usize) -> EngineConfig {
    EngineConfig::new(m, model).with_scheduler(SchedulerConfig {
        batch_size,
        workers: Some(workers),
        reserved_workers: 0,
    })
}

fn samples(rng: &mut SmallRng, m: usize, n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| (0..m).map(|_| rng.random::<f64>()).collect())
        .collect()
}

/// Two-feature walkthrough: commit, reinforce, commit.
#[test]
fn two_feature_scenario() {
    let mut art = FuzzyArt::new(2, 0.9, 0.01, 1.0).unwrap();

    let first = art.fit(&[0.1, 0.2]);
    assert_eq!(first.category, 0);
    assert_eq!(first.outcome, Outcome::Committed);
    assert_eq!(art.category_count(), 1);

    let again = art.fit(&[0.1, 0.2]);
    assert_eq!(again.category, 0);
    assert_eq!(again.outcome, Outcome::Reinforced);
    assert_abs_diff_eq!(again.resonance, 1.0, epsilon = 1e-12);
    assert_eq!(art.category_count(), 1);

    let far = art.fit(&[0.9, 0.9]);
    assert_eq!(far.category, 1);
    assert_eq!(far.outcome, Outcome::Committed);
    assert_eq!(art.category_count(), 2);

    // The far point scored well below vigilance against category 0.
    let probe = art.predict(&[0.1, 0.2], false).unwrap();
    assert_eq!(probe.category, 0);
    art.close();
}

/// Same scenario on every backend this host can run.
#[test]
fn scenario_agrees_across_backends() {
    for kernel in kernel::available(&Capabilities::detect()) {
        let mut art =
            FuzzyArt::with_kernel(config(2, ArtConfig::new(0.9, 0.01, 1.0), 2, 64), kernel)
                .unwrap();
        let seq: Vec<usize> = [[0.1, 0.2], [0.1, 0.2], [0.9, 0.9]]
            .iter()
            .map(|x| art.fit(x).category)
            .collect();
        assert_eq!(seq, vec![0, 0, 1], "backend {}", kernel.name());
    }
}

/// Clustered data: points near three centers land in three categories.
#[test]
fn separated_clusters_get_separate_categories() {
    let mut rng = rng();
    let centers: [[f64; 3]; 3] = [[0.1, 0.1, 0.1], [0.5, 0.9, 0.2], [0.9, 0.3, 0.8]];
    let mut art = FuzzyArt::from_config(config(3, ArtConfig::new(0.85, 0.01, 1.0), 4, 2)).unwrap();

    let mut labels = Vec::new();
    for _ in 0..30 {
        for (c, center) in centers.iter().enumerate() {
            let x: Vec<f64> = center
                .iter()
                .map(|v| (v + rng.random_range(-0.02..0.02)).clamp(0.0, 1.0))
                .collect();
            labels.push((c, art.fit(&x).category));
        }
    }

    assert_eq!(art.category_count(), 3);
    for (c, category) in labels {
        assert_eq!(category, c, "center {c} drifted into category {category}");
    }
}

/// Learning only ever shrinks a prototype under fast learning.
#[test]
fn fast_learning_prototypes_shrink() {
    let mut rng = rng();
    let mut art = FuzzyArt::new(4, 0.0, 0.01, 1.0).unwrap();
    art.fit(&[0.5; 4]);
    let mut previous = art.prototype(0).unwrap().to_vec();
    for x in samples(&mut rng, 4, 40) {
        art.fit(&x);
        let current = art.prototype(0).unwrap();
        for (now, before) in current.iter().zip(&previous) {
            assert!(*now <= *before + 1e-15);
        }
        previous = current.to_vec();
    }
}

#[test]
fn slow_learning_blends_toward_intersection() {
    let mut art = FuzzyArt::new(1, 0.0, 0.01, 0.25).unwrap();
    art.fit(&[0.8]);
    art.fit(&[0.4]);
    let p = art.prototype(0).unwrap();
    // fi = [0.4, 0.2]; w = 0.25 * fi + 0.75 * [0.8, 0.2]
    assert_abs_diff_eq!(p[0], 0.7, epsilon = 1e-12);
    assert_abs_diff_eq!(p[1], 0.2, epsilon = 1e-12);
}

#[test]
fn scratch_accounting_over_mixed_calls() {
    let mut rng = rng();
    let mut art = FuzzyArt::from_config(config(5, ArtConfig::new(0.8, 0.01, 1.0), 3, 4)).unwrap();
    art.predict(&[0.5; 5], false);
    for (i, x) in samples(&mut rng, 5, 60).iter().enumerate() {
        art.predict(x, i % 3 != 0);
        let stats = art.scratch_stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.acquired, stats.released);
    }
}

#[test]
fn complement_code_norm_is_feature_count() {
    let mut rng = rng();
    for x in samples(&mut rng, 17, 20) {
        let sum: f64 = kernel::shared().sum(&complement_code(&x));
        assert_abs_diff_eq!(sum, 17.0, epsilon = 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn results_independent_of_workers_and_batch(
        seed in any::<u64>(),
        rho in 0.3f64..0.95,
        workers in 1usize..6,
        batch in 1usize..20,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let data = samples(&mut rng, 6, 60);
        let model = ArtConfig::new(rho, 0.01, 1.0);
        let kernel = kernel::shared();

        let mut reference = FuzzyArt::with_kernel(config(6, model, 1, 1024), kernel).unwrap();
        let mut tuned = FuzzyArt::with_kernel(config(6, model, workers, batch), kernel).unwrap();

        for x in &data {
            prop_assert_eq!(reference.fit(x), tuned.fit(x));
        }
        for x in &data {
            prop_assert_eq!(reference.predict(x, false), tuned.predict(x, false));
        }
        prop_assert_eq!(reference.prototypes(), tuned.prototypes());
    }

    #[test]
    fn resonance_stays_in_unit_interval(
        seed in any::<u64>(),
        rho in 0.0f64..=1.0,
        beta in 0.05f64..=1.0,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut art = FuzzyArt::new(4, rho, 0.01, beta).unwrap();
        for x in samples(&mut rng, 4, 30) {
            let fit = art.fit(&x);
            prop_assert!((0.0..=1.0 + 1e-12).contains(&fit.resonance));
            let probe = art.predict(&x, false).unwrap();
            prop_assert!((0.0..=1.0 + 1e-12).contains(&probe.resonance));
        }
        for proto in art.prototypes().rows() {
            for v in proto {
                prop_assert!((0.0..=1.0).contains(v));
            }
        }
    }

    #[test]
    fn full_vigilance_grows_on_every_new_input(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut art = FuzzyArt::new(3, 1.0, 0.01, 1.0).unwrap();
        for (i, x) in samples(&mut rng, 3, 15).iter().enumerate() {
            art.fit(x);
            prop_assert_eq!(art.category_count(), i + 1);
        }
    }
}
